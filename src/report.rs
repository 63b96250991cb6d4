//! Worklog report requests and downloads.
use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Body of the `issuereport` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub start_date: String,
    pub end_date: String,
}

impl ReportRequest {
    /// Validate both dates as `YYYY-MM-DD` and keep them as given.
    pub fn new(start_date: &str, end_date: &str) -> Result<Self> {
        let start = parse_date(start_date).context("start date")?;
        let end = parse_date(end_date).context("end date")?;
        if end < start {
            return Err(anyhow!(
                "end date {end_date} is before start date {start_date}"
            ));
        }
        Ok(Self {
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        })
    }
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .with_context(|| format!("expected YYYY-MM-DD, got {text:?}"))
}

/// `JIRA_query_<Y>-<M>-<D>_<h>-<m>.csv`, fields unpadded.
pub fn report_file_name(now: NaiveDateTime) -> String {
    format!(
        "JIRA_query_{}-{}-{}_{}-{}.csv",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
        now.minute()
    )
}

/// Write the downloaded report text verbatim under `dir`.
pub fn write_report(dir: &Path, file_name: &str, text: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(file_name);
    fs::write(&path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = text.len(), "report written");
    Ok(path)
}
