//! JSON form files.
//!
//! A form file is a flat JSON object keyed by source field name, the same names
//! the template gives its inputs. It is both the read surface for payload
//! assembly and the place where tracker results are written back.
use crate::assemble::FieldSource;
use crate::schema::{ISSUE_KEY_FIELD, ISSUE_STATUS_FIELD, STATUS_NOT_SET};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("read form {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("write form {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse form {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("form {path} must be a JSON object")]
    NotAnObject { path: PathBuf },
    #[error("form field `{field}` must be a string, number, boolean, or null")]
    NonScalar { field: String },
}

#[derive(Debug, Clone, Default)]
pub struct FormFile {
    fields: Map<String, Value>,
}

impl FormFile {
    pub fn load(path: &Path) -> Result<Self, FormError> {
        let bytes = fs::read(path).map_err(|source| FormError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|source| FormError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let Value::Object(fields) = value else {
            return Err(FormError::NotAnObject {
                path: path.to_path_buf(),
            });
        };
        Self::from_map(fields)
    }

    /// Build a form from already-parsed JSON, rejecting nested values.
    pub fn from_map(fields: Map<String, Value>) -> Result<Self, FormError> {
        if let Some((field, _)) = fields
            .iter()
            .find(|(_, value)| matches!(value, Value::Array(_) | Value::Object(_)))
        {
            return Err(FormError::NonScalar {
                field: field.clone(),
            });
        }
        Ok(Self { fields })
    }

    /// Persist the form as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), FormError> {
        let text = serde_json::to_string_pretty(&self.fields).map_err(|source| FormError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, format!("{text}\n")).map_err(|source| FormError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn issue_key(&self) -> String {
        self.field(ISSUE_KEY_FIELD).unwrap_or_default()
    }

    /// Workflow status as last recorded in the form.
    pub fn status(&self) -> String {
        self.field(ISSUE_STATUS_FIELD)
            .unwrap_or_else(|| STATUS_NOT_SET.to_string())
    }

    pub fn set(&mut self, field: &str, value: &str) {
        self.fields
            .insert(field.to_string(), Value::String(value.to_string()));
    }

    /// Store the key (and status, when known) returned by the tracker.
    pub fn record_update(&mut self, key: &str, status: Option<&str>) {
        self.set(ISSUE_KEY_FIELD, key);
        if let Some(status) = status {
            self.set(ISSUE_STATUS_FIELD, status);
        }
    }
}

impl FieldSource for FormFile {
    fn field(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::String(text) => Some(text.clone()),
            Value::Null => Some(String::new()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: Value) -> FormFile {
        let Value::Object(map) = value else {
            panic!("test form must be an object");
        };
        FormFile::from_map(map).expect("valid form")
    }

    #[test]
    fn scalars_render_as_text() {
        let form = form(json!({"title": "Ledger", "score": 7, "approval": true, "expense": null}));
        assert_eq!(form.field("title").as_deref(), Some("Ledger"));
        assert_eq!(form.field("score").as_deref(), Some("7"));
        assert_eq!(form.field("approval").as_deref(), Some("true"));
        assert_eq!(form.field("expense").as_deref(), Some(""));
        assert_eq!(form.field("missing"), None);
    }

    #[test]
    fn nested_values_are_rejected() {
        let Value::Object(map) = json!({"risks": ["a", "b"]}) else {
            unreachable!()
        };
        let err = FormFile::from_map(map).expect_err("array rejected");
        assert!(matches!(err, FormError::NonScalar { field } if field == "risks"));
    }

    #[test]
    fn status_defaults_to_not_set() {
        assert_eq!(form(json!({})).status(), STATUS_NOT_SET);
        assert_eq!(form(json!({"issuestatus": "HLE"})).status(), "HLE");
        assert_eq!(form(json!({})).issue_key(), "");
    }

    #[test]
    fn record_update_keeps_status_when_unknown() {
        let mut form = form(json!({"issuekey": "", "issuestatus": "To Do"}));
        form.record_update("OPS-4", None);
        assert_eq!(form.issue_key(), "OPS-4");
        assert_eq!(form.status(), "To Do");
        form.record_update("OPS-4", Some("Initiative Approved"));
        assert_eq!(form.status(), "Initiative Approved");
    }

    #[test]
    fn save_and_load_preserve_fields() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("form.json");
        let mut original = form(json!({"title": "Ledger"}));
        original.record_update("OPS-1", Some("HLE"));
        original.save(&path).expect("save form");

        let loaded = FormFile::load(&path).expect("load form");
        assert_eq!(loaded.field("title").as_deref(), Some("Ledger"));
        assert_eq!(loaded.issue_key(), "OPS-1");
        assert_eq!(loaded.status(), "HLE");
    }

    #[test]
    fn save_keeps_field_order() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("form.json");
        std::fs::write(
            &path,
            r#"{"zeta": "z", "issuestatus": "To Do", "alpha": "a", "issuekey": ""}"#,
        )
        .expect("write form");

        let mut form = FormFile::load(&path).expect("load form");
        form.record_update("OPS-7", Some("HLE"));
        form.save(&path).expect("save form");

        let text = std::fs::read_to_string(&path).expect("read form");
        let at = |key: &str| text.find(&format!("\"{key}\"")).expect("key present");
        assert!(at("zeta") < at("issuestatus"), "{text}");
        assert!(at("issuestatus") < at("alpha"), "{text}");
        assert!(at("alpha") < at("issuekey"), "{text}");
    }

    #[test]
    fn non_object_root_is_rejected() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("form.json");
        std::fs::write(&path, "[1, 2]").expect("write form");
        assert!(matches!(
            FormFile::load(&path),
            Err(FormError::NotAnObject { .. })
        ));
    }
}
