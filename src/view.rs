//! Display state for an initiative: what the form page shows.
use crate::client::{IssueStatus, UpdateResult};
use crate::schema::is_base_status;
use serde::Serialize;
use std::fmt;

pub const CREATE_LABEL: &str = "Create Initiative";
pub const UPDATE_LABEL: &str = "Update Initiative";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub issue_key: String,
    pub status: String,
    pub link: Option<String>,
    pub submit_label: &'static str,
    pub extended_visible: bool,
}

impl PageView {
    pub fn from_form(issue_key: &str, status: &str) -> Self {
        let mut view = Self {
            issue_key: issue_key.to_string(),
            status: status.to_string(),
            link: None,
            submit_label: CREATE_LABEL,
            extended_visible: false,
        };
        view.refresh();
        view
    }

    pub fn apply_status(&mut self, issue: &IssueStatus) {
        self.issue_key = issue.key.clone();
        self.status = issue.status.clone();
        self.link = Some(issue.link.clone());
        self.refresh();
    }

    pub fn apply_update(&mut self, result: &UpdateResult) {
        self.issue_key = result.key.clone();
        if let Some(link) = &result.link {
            self.link = Some(link.clone());
        }
        self.refresh();
    }

    fn refresh(&mut self) {
        self.submit_label = if self.issue_key.is_empty() {
            CREATE_LABEL
        } else {
            UPDATE_LABEL
        };
        self.extended_visible = !is_base_status(&self.status);
    }
}

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.issue_key.is_empty() {
            "(none)"
        } else {
            self.issue_key.as_str()
        };
        writeln!(f, "issue:    {key}")?;
        writeln!(f, "status:   {}", self.status)?;
        writeln!(f, "link:     {}", self.link.as_deref().unwrap_or("(none)"))?;
        writeln!(f, "action:   {}", self.submit_label)?;
        write!(
            f,
            "extended: {}",
            if self.extended_visible { "shown" } else { "hidden" }
        )
    }
}
