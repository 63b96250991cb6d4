//! Static field schema for initiative payloads.
//!
//! One ordered table drives every assembly path: adding a field here is the
//! only step needed for it to reach the update payload.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Which payload tier a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Sent for every status.
    Base,
    /// Sent only once the initiative is past the base statuses.
    Extended,
}

/// A single `(source_field, payload_key, tier)` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub source: &'static str,
    pub key: &'static str,
    pub tier: Tier,
}

const fn base(source: &'static str, key: &'static str) -> FieldSpec {
    FieldSpec {
        source,
        key,
        tier: Tier::Base,
    }
}

const fn extended(source: &'static str, key: &'static str) -> FieldSpec {
    FieldSpec {
        source,
        key,
        tier: Tier::Extended,
    }
}

/// Field table in payload order. Base entries come first.
pub const FIELDS: &[FieldSpec] = &[
    base("issuekey", "issueKey"),
    base("issuetype", "issueType"),
    base("title", "title"),
    base("submitdate", "submitDate"),
    base("customer", "customer"),
    base("project", "project"),
    base("summary", "summary"),
    base("deliverydate", "deliveryDate"),
    base("statement", "statement"),
    base("outcome", "outcome"),
    base("justification", "justification"),
    base("revenue", "revenue"),
    base("opportunity", "opportunity"),
    base("expense", "expense"),
    extended("introduction", "introduction"),
    extended("audience", "audience"),
    extended("background", "background"),
    extended("objective", "objective"),
    extended("stakeholders", "stakeholders"),
    extended("assumptions", "assumptions"),
    extended("outofscope", "outofscope"),
    extended("dependencies", "dependencies"),
    extended("techimpact", "techimpact"),
    extended("opimpact", "opimpact"),
    extended("overview", "overview"),
    extended("description", "description"),
    extended("performance", "performance"),
    extended("constraints", "constraints"),
    extended("milestones", "milestones"),
    extended("analysis", "analysis"),
    extended("risks", "risks"),
    extended("payimpact", "payImpact"),
    extended("rmimpact", "rmImpact"),
    extended("finimpact", "finImpact"),
    extended("isimpact", "isImpact"),
    extended("eaimpact", "eaImpact"),
    extended("nfrequirements", "nfRequirements"),
    extended("devestimate", "devEstimate"),
    extended("otherestimate", "otherEstimate"),
    extended("approval", "approval"),
    extended("score", "score"),
];

/// Workflow states that precede initiative approval.
pub const BASE_STATUSES: &[&str] = &[
    "New Initiative",
    "Inception Backlog",
    "HLE",
    "Status not set",
    "To Do",
    "",
];

/// Status shown before the tracker has reported one.
pub const STATUS_NOT_SET: &str = "Status not set";

/// Source field holding the tracker issue key.
pub const ISSUE_KEY_FIELD: &str = "issuekey";

/// Source field holding the workflow status. Not part of the payload.
pub const ISSUE_STATUS_FIELD: &str = "issuestatus";

/// Exact, case-sensitive membership test against [`BASE_STATUSES`].
pub fn is_base_status(status: &str) -> bool {
    BASE_STATUSES.contains(&status)
}

/// Fields of one tier, in table order.
pub fn tier_fields(tier: Tier) -> impl Iterator<Item = &'static FieldSpec> {
    FIELDS.iter().filter(move |spec| spec.tier == tier)
}

/// Ordered payload sent as the body of an update request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    entries: Vec<(&'static str, String)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, replacing any earlier value in place.
    pub fn insert(&mut self, key: &'static str, value: String) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the payload as the JSON request body.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
