//! HTTP client for the initiative REST resource.
//!
//! Every call goes through [`TrackerClient::submit`], which posts a body to one
//! [`Endpoint`] and returns the response text. The typed calls only shape the
//! request body and parse the response. Nothing is retried.
use crate::link::browse_link;
use crate::report::ReportRequest;
use crate::schema::Payload;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Path of the REST resource below the site base URL.
pub const RESOURCE_PATH: &str = "rest/jirarequest/1.0";

const JSON_CONTENT_TYPE: &str = "application/json";

/// The three endpoints exposed by the REST resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    IssueReport,
    UpdateIssue,
    IssueStatus,
}

impl Endpoint {
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::IssueReport => "issuereport",
            Endpoint::UpdateIssue => "updateissue",
            Endpoint::IssueStatus => "issuestatus",
        }
    }

    /// Full URL of the endpoint below `base_url`.
    pub fn url(self, base_url: &str) -> String {
        format!(
            "{}/{RESOURCE_PATH}/{}",
            base_url.trim_end_matches('/'),
            self.name()
        )
    }
}

/// Failure below HTTP status handling: connect, timeout, IO.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct TransportError {
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{endpoint} request failed")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("{endpoint} returned HTTP {code}: {body}")]
    Status {
        endpoint: &'static str,
        code: u16,
        body: String,
    },

    #[error("{endpoint} returned a malformed response: {reason}")]
    MalformedResponse {
        endpoint: &'static str,
        reason: String,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Raw response as seen by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Something that can POST a text body and return the response.
pub trait Transport {
    fn post(
        &self,
        url: &str,
        content_type: &str,
        body: &str,
    ) -> Result<TransportResponse, TransportError>;
}

/// Blocking `ureq` transport.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn post(
        &self,
        url: &str,
        content_type: &str,
        body: &str,
    ) -> Result<TransportResponse, TransportError> {
        let mut response = self
            .agent
            .post(url)
            .header("Content-Type", content_type)
            .send(body)
            .map_err(|err| TransportError {
                reason: err.to_string(),
            })?;
        let status = response.status().as_u16();
        // Reports can be large; the download is not capped.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_string()
            .map_err(|err| TransportError {
                reason: format!("read response body: {err}"),
            })?;
        Ok(TransportResponse { status, body })
    }
}

/// Outcome of a create/update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResult {
    pub key: String,
    pub link: Option<String>,
}

/// Workflow state of an existing issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueStatus {
    pub status: String,
    pub key: String,
    pub link: String,
}

#[derive(Deserialize)]
struct UpdateResponse {
    key: String,
    #[serde(rename = "self", default)]
    self_url: Option<String>,
}

#[derive(Deserialize)]
struct IssueResponse {
    key: String,
    #[serde(rename = "self")]
    self_url: String,
    fields: IssueFields,
}

#[derive(Deserialize)]
struct IssueFields {
    status: StatusField,
}

#[derive(Deserialize)]
struct StatusField {
    name: String,
}

static ISSUE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*-[0-9]+$").expect("regex for issue keys"));

/// True when `key` looks like a tracker issue key such as `OPS-12`.
pub fn is_issue_key(key: &str) -> bool {
    ISSUE_KEY.is_match(key)
}

pub struct TrackerClient<T> {
    base_url: String,
    transport: T,
}

impl<T: Transport> TrackerClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `endpoint` and return the response text of a 2xx reply.
    pub fn submit(&self, endpoint: Endpoint, body: &str) -> ClientResult<String> {
        let url = endpoint.url(&self.base_url);
        tracing::debug!(%url, request_bytes = body.len(), "tracker request");
        let start = Instant::now();
        let response = self
            .transport
            .post(&url, JSON_CONTENT_TYPE, body)
            .map_err(|source| ClientError::Transport {
                endpoint: endpoint.name(),
                source,
            })?;
        tracing::info!(
            endpoint = endpoint.name(),
            status = response.status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            response_bytes = response.body.len(),
            "tracker request complete"
        );
        if !(200..300).contains(&response.status) {
            return Err(ClientError::Status {
                endpoint: endpoint.name(),
                code: response.status,
                body: response.body,
            });
        }
        Ok(response.body)
    }

    /// Request the worklog report; the response is CSV text.
    pub fn issue_report(&self, request: &ReportRequest) -> ClientResult<String> {
        let body = serde_json::to_string(request)
            .map_err(|err| ClientError::InvalidRequest(format!("encode report request: {err}")))?;
        self.submit(Endpoint::IssueReport, &body)
    }

    /// Create (empty `issueKey`) or update the initiative described by `payload`.
    pub fn update_issue(&self, payload: &Payload) -> ClientResult<UpdateResult> {
        let body = payload
            .to_json()
            .map_err(|err| ClientError::InvalidRequest(format!("encode payload: {err}")))?;
        let text = self.submit(Endpoint::UpdateIssue, &body)?;
        let parsed: UpdateResponse =
            serde_json::from_str(&text).map_err(|err| ClientError::MalformedResponse {
                endpoint: Endpoint::UpdateIssue.name(),
                reason: err.to_string(),
            })?;
        let link = parsed
            .self_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| browse_link(url, &parsed.key));
        Ok(UpdateResult {
            key: parsed.key,
            link,
        })
    }

    /// Fetch the workflow status of `key`.
    ///
    /// An empty key, an empty body, or `null` mean there is nothing to show yet.
    pub fn issue_status(&self, key: &str) -> ClientResult<Option<IssueStatus>> {
        if key.is_empty() {
            tracing::debug!("no issue key; skipping status fetch");
            return Ok(None);
        }
        let text = self.submit(Endpoint::IssueStatus, key)?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        let parsed: Option<IssueResponse> =
            serde_json::from_str(&text).map_err(|err| ClientError::MalformedResponse {
                endpoint: Endpoint::IssueStatus.name(),
                reason: err.to_string(),
            })?;
        Ok(parsed.map(|issue| IssueStatus {
            link: browse_link(&issue.self_url, &issue.key),
            status: issue.fields.status.name,
            key: issue.key,
        }))
    }
}
