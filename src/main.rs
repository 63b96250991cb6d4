use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{
    Command, GlobalArgs, InitArgs, PayloadArgs, ReportArgs, RootArgs, StatusArgs, UpdateArgs,
    ViewArgs,
};
use initiative_bridge::assemble::select_payload;
use initiative_bridge::client::{
    is_issue_key, Endpoint, IssueStatus, TrackerClient, UreqTransport, RESOURCE_PATH,
};
use initiative_bridge::config::{self, Settings};
use initiative_bridge::form::FormFile;
use initiative_bridge::report::{report_file_name, write_report, ReportRequest};
use initiative_bridge::schema;
use initiative_bridge::view::PageView;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.global.verbose);

    match args.command {
        Command::Init(cmd) => cmd_init(&args.global, cmd),
        Command::Payload(cmd) => cmd_payload(cmd),
        Command::View(cmd) => cmd_view(cmd),
        Command::Status(cmd) => cmd_status(&args.global, cmd),
        Command::Update(cmd) => cmd_update(&args.global, cmd),
        Command::Report(cmd) => cmd_report(&args.global, cmd),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_settings(global: &GlobalArgs) -> Result<Settings> {
    let file = config::load_or_default(global.config.as_deref())?;
    let overrides = config::Overrides {
        base_url: global.base_url.clone(),
        timeout_secs: global.timeout_secs,
    };
    config::resolve_settings(&overrides, &file, std::env::var(config::BASE_URL_ENV).ok())
}

fn build_client(settings: &Settings) -> Result<TrackerClient<UreqTransport>> {
    let base_url = settings.require_base_url()?;
    Ok(TrackerClient::new(base_url, UreqTransport::new(settings.timeout)))
}

fn cmd_init(global: &GlobalArgs, args: InitArgs) -> Result<()> {
    let path = args
        .path
        .or_else(|| global.config.clone())
        .or_else(config::default_config_path)
        .ok_or_else(|| anyhow!("no config path given and no per-user config dir"))?;
    if path.exists() && !args.force {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        ));
    }
    let mut client_config = config::default_config();
    client_config.base_url = global.base_url.clone();
    if global.timeout_secs.is_some() {
        client_config.timeout_secs = global.timeout_secs;
    }
    client_config.report_dir = args.report_dir;
    config::write_config(&path, &client_config)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn cmd_payload(args: PayloadArgs) -> Result<()> {
    let form = FormFile::load(&args.form)?;
    let status = args.status.unwrap_or_else(|| form.status());
    let payload = select_payload(&form, &status)
        .with_context(|| format!("assemble payload from {}", args.form.display()))?;
    let text = if args.pretty {
        serde_json::to_string_pretty(&payload)?
    } else {
        payload.to_json()?
    };
    println!("{text}");
    Ok(())
}

fn cmd_view(args: ViewArgs) -> Result<()> {
    let form = FormFile::load(&args.form)?;
    let view = PageView::from_form(&form.issue_key(), &form.status());
    print_view(&view, args.json)
}

fn cmd_status(global: &GlobalArgs, args: StatusArgs) -> Result<()> {
    let mut form = match &args.form {
        Some(path) => Some(FormFile::load(path)?),
        None => None,
    };
    let key = match (&form, &args.key) {
        (Some(form), _) => form.issue_key(),
        (None, Some(key)) => key.clone(),
        (None, None) => return Err(anyhow!("either --form or --key is required")),
    };
    if !key.is_empty() && !is_issue_key(&key) {
        tracing::warn!(key = %key, "issue key does not look like PROJECT-123");
    }

    let settings = resolve_settings(global)?;
    let client = build_client(&settings)?;
    let fetched = client
        .issue_status(&key)
        .with_context(|| format!("fetch status of {key:?}"))?;

    let status = form
        .as_ref()
        .map(FormFile::status)
        .unwrap_or_else(|| schema::STATUS_NOT_SET.to_string());
    let mut view = PageView::from_form(&key, &status);
    match &fetched {
        Some(issue) => view.apply_status(issue),
        None => tracing::info!(key = %key, "tracker reported no status"),
    }

    if args.write {
        if let (Some(form), Some(path)) = (form.as_mut(), &args.form) {
            match &fetched {
                Some(issue) => {
                    form.record_update(&issue.key, Some(&issue.status));
                    form.save(path)?;
                }
                None => eprintln!(
                    "No tracker status for {key:?}; {} left unchanged",
                    path.display()
                ),
            }
        }
    }
    print_view(&view, args.json)
}

fn cmd_update(global: &GlobalArgs, args: UpdateArgs) -> Result<()> {
    let mut form = FormFile::load(&args.form)?;
    let settings = resolve_settings(global)?;

    if args.dry_run {
        let payload = select_payload(&form, &form.status())
            .with_context(|| format!("assemble payload from {}", args.form.display()))?;
        let target = match settings.base_url.as_deref() {
            Some(base_url) => Endpoint::UpdateIssue.url(base_url),
            None => format!("<base>/{RESOURCE_PATH}/{}", Endpoint::UpdateIssue.name()),
        };
        println!("POST {target}");
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let client = build_client(&settings)?;
    // Gate on the tracker's current status; the form may hold a stale one.
    let status = match fetch_status(&client, &form.issue_key(), "status fetch before update") {
        Some(issue) => issue.status,
        None => form.status(),
    };
    let payload = select_payload(&form, &status)
        .with_context(|| format!("assemble payload from {}", args.form.display()))?;
    let result = client
        .update_issue(&payload)
        .context("failed to update initiative")?;
    let mut view = PageView::from_form(&form.issue_key(), &status);
    view.apply_update(&result);

    // The page reloads after an update; the status is re-read the same way.
    let refreshed = fetch_status(&client, &result.key, "status refresh after update");
    if let Some(issue) = &refreshed {
        view.apply_status(issue);
    }

    if !args.no_write {
        form.record_update(&result.key, refreshed.as_ref().map(|issue| issue.status.as_str()));
        form.save(&args.form)?;
    }
    println!("Updated {}", result.key);
    print_view(&view, false)
}

/// Best-effort status lookup; failures are logged and read as "unknown".
fn fetch_status(
    client: &TrackerClient<UreqTransport>,
    key: &str,
    stage: &str,
) -> Option<IssueStatus> {
    match client.issue_status(key) {
        Ok(issue) => issue,
        Err(err) => {
            tracing::warn!(key, error = %err, "{stage} failed");
            None
        }
    }
}

fn cmd_report(global: &GlobalArgs, args: ReportArgs) -> Result<()> {
    let request = ReportRequest::new(&args.start, &args.end)?;
    let settings = resolve_settings(global)?;
    let client = build_client(&settings)?;
    let text = client
        .issue_report(&request)
        .context("error generating report")?;
    let out_dir = args
        .out_dir
        .or_else(|| settings.report_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = report_file_name(chrono::Local::now().naive_local());
    let path = write_report(&out_dir, &file_name, &text)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn print_view(view: &PageView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        println!("{view}");
    }
    Ok(())
}
