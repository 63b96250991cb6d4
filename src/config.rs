//! Client configuration.
//!
//! Settings are resolved in priority order:
//! 1. CLI flags (`--base-url`, `--timeout-secs`)
//! 2. The JSON config file (`--config`, else `<config dir>/initiative/config.json`)
//! 3. The `INITIATIVE_BASE_URL` environment variable
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const BASE_URL_ENV: &str = "INITIATIVE_BASE_URL";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub schema_version: u32,
    /// Site base URL; the REST resource lives below it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Where downloaded reports are written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<PathBuf>,
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings used by the commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub report_dir: Option<PathBuf>,
}

impl Settings {
    pub fn require_base_url(&self) -> Result<&str> {
        self.base_url.as_deref().ok_or_else(|| {
            anyhow!("no base URL configured (use --base-url, the config file, or {BASE_URL_ENV})")
        })
    }
}

pub fn default_config() -> ClientConfig {
    ClientConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        base_url: None,
        timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        report_dir: None,
    }
}

/// Per-user config location, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("initiative").join("config.json"))
}

pub fn load_config(path: &Path) -> Result<ClientConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: ClientConfig =
        serde_json::from_slice(&bytes).context("parse client config JSON")?;
    validate_config(&config)?;
    Ok(config)
}

/// Persist a config to disk in a stable JSON format.
pub fn write_config(path: &Path, config: &ClientConfig) -> Result<()> {
    validate_config(config)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create config dir")?;
    }
    let text = serde_json::to_string_pretty(config).context("serialize client config")?;
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Load the explicit config, else the per-user one if present, else defaults.
pub fn load_or_default(explicit: Option<&Path>) -> Result<ClientConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match default_config_path() {
        Some(path) if path.is_file() => {
            tracing::debug!(path = %path.display(), "loading user config");
            load_config(&path)
        }
        _ => Ok(default_config()),
    }
}

pub fn validate_config(config: &ClientConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported client config schema_version {}",
            config.schema_version
        ));
    }
    if let Some(base_url) = config.base_url.as_deref() {
        validate_base_url(base_url)?;
    }
    if config.timeout_secs == Some(0) {
        return Err(anyhow!("timeout_secs must be positive"));
    }
    Ok(())
}

fn validate_base_url(base_url: &str) -> Result<()> {
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(anyhow!(
            "base URL must start with http:// or https:// (got {base_url:?})"
        ));
    }
    Ok(())
}

/// Merge flags, file, and environment into [`Settings`].
pub fn resolve_settings(
    overrides: &Overrides,
    config: &ClientConfig,
    env_base_url: Option<String>,
) -> Result<Settings> {
    let base_url = overrides
        .base_url
        .clone()
        .or_else(|| config.base_url.clone())
        .or(env_base_url.filter(|value| !value.trim().is_empty()));
    if let Some(base_url) = base_url.as_deref() {
        validate_base_url(base_url)?;
    }
    let timeout_secs = overrides
        .timeout_secs
        .or(config.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(anyhow!("timeout must be positive"));
    }
    Ok(Settings {
        base_url,
        timeout: Duration::from_secs(timeout_secs),
        report_dir: config.report_dir.clone(),
    })
}
