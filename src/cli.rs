//! CLI argument parsing for the initiative client.
//!
//! The CLI only wires flags to the assembly, client, and view modules.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "initiative",
    version,
    about = "Sync initiative forms with the issue tracker",
    after_help = "Examples:\n  initiative init --base-url https://wiki.example/confluence\n  initiative payload --form charter.json\n  initiative view --form charter.json\n  initiative status --form charter.json --write\n  initiative update --form charter.json\n  initiative report --start 2024-01-01 --end 2024-01-31 --out-dir reports",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Site base URL; the REST resource is below <URL>/rest/jirarequest/1.0
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Client config file (defaults to the per-user config)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Overall request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Emit debug logs
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Init(InitArgs),
    Payload(PayloadArgs),
    View(ViewArgs),
    Status(StatusArgs),
    Update(UpdateArgs),
    Report(ReportArgs),
}

/// Init command inputs for writing a client config.
#[derive(Parser, Debug)]
#[command(about = "Write a client config file")]
pub struct InitArgs {
    /// Config path to write (defaults to --config, then the per-user config)
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Directory for downloaded reports
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,
}

/// Payload command inputs for previewing a request body offline.
#[derive(Parser, Debug)]
#[command(about = "Print the update payload a form would produce")]
pub struct PayloadArgs {
    /// Form file (JSON object keyed by field name)
    #[arg(long, value_name = "FILE")]
    pub form: PathBuf,

    /// Workflow status to gate on (defaults to the form's issuestatus)
    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,

    /// Emit pretty JSON instead of the compact request body
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Show the page state derived from a form")]
pub struct ViewArgs {
    /// Form file (JSON object keyed by field name)
    #[arg(long, value_name = "FILE")]
    pub form: PathBuf,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Status command inputs; exactly one of `--form` or `--key`.
#[derive(Parser, Debug)]
#[command(about = "Fetch an initiative's workflow status from the tracker")]
pub struct StatusArgs {
    /// Form file whose issuekey is looked up
    #[arg(long, value_name = "FILE", required_unless_present = "key", conflicts_with = "key")]
    pub form: Option<PathBuf>,

    /// Issue key to look up
    #[arg(long, value_name = "KEY")]
    pub key: Option<String>,

    /// Store the fetched status back into the form
    #[arg(long, requires = "form")]
    pub write: bool,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Create or update the initiative described by a form")]
pub struct UpdateArgs {
    /// Form file (JSON object keyed by field name)
    #[arg(long, value_name = "FILE")]
    pub form: PathBuf,

    /// Print the payload and endpoint without sending
    #[arg(long)]
    pub dry_run: bool,

    /// Leave the form file untouched after a successful update
    #[arg(long)]
    pub no_write: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Download the worklog report for a date range")]
pub struct ReportArgs {
    /// First day of the range (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start: String,

    /// Last day of the range (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end: String,

    /// Directory for the CSV (defaults to the config's report_dir, then .)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}
