//! Payload assembly and the status gate.
//!
//! Field values are read fresh from the injected [`FieldSource`] on every call.
use crate::schema::{is_base_status, tier_fields, Payload, Tier};
use std::collections::BTreeMap;
use thiserror::Error;

/// Read access to named form fields.
pub trait FieldSource {
    /// Current value of `name`, or `None` when the form has no such field.
    fn field(&self, name: &str) -> Option<String>;
}

impl FieldSource for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssembleError {
    /// The form does not define a field the schema requires.
    #[error("form is missing required field `{field}`")]
    MissingField { field: &'static str },
}

fn append_tier(
    payload: &mut Payload,
    source: &dyn FieldSource,
    tier: Tier,
) -> Result<(), AssembleError> {
    for spec in tier_fields(tier) {
        let value = source
            .field(spec.source)
            .ok_or(AssembleError::MissingField { field: spec.source })?;
        payload.insert(spec.key, value);
    }
    Ok(())
}

/// Minimal payload: every base field under its payload key.
pub fn assemble_base(source: &dyn FieldSource) -> Result<Payload, AssembleError> {
    let mut payload = Payload::new();
    append_tier(&mut payload, source, Tier::Base)?;
    Ok(payload)
}

/// Base payload followed by every extended field.
pub fn assemble_extended(source: &dyn FieldSource) -> Result<Payload, AssembleError> {
    let mut payload = assemble_base(source)?;
    append_tier(&mut payload, source, Tier::Extended)?;
    Ok(payload)
}

/// Extended payload once `status` has left the base statuses, base otherwise.
pub fn select_payload(source: &dyn FieldSource, status: &str) -> Result<Payload, AssembleError> {
    let extended = !is_base_status(status);
    tracing::debug!(status, extended, "selecting payload tier");
    if extended {
        assemble_extended(source)
    } else {
        assemble_base(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BASE_STATUSES, FIELDS};
    use std::cell::Cell;
    use std::collections::BTreeSet;

    fn full_form() -> BTreeMap<String, String> {
        FIELDS
            .iter()
            .map(|spec| (spec.source.to_string(), format!("value of {}", spec.source)))
            .collect()
    }

    fn keys_of(tier: Tier) -> BTreeSet<&'static str> {
        tier_fields(tier).map(|spec| spec.key).collect()
    }

    #[test]
    fn base_statuses_yield_exactly_base_keys() {
        let form = full_form();
        for status in BASE_STATUSES {
            let payload = select_payload(&form, status).expect("assemble");
            let keys: BTreeSet<_> = payload.keys().collect();
            assert_eq!(keys, keys_of(Tier::Base), "status {status:?}");
        }
    }

    #[test]
    fn other_statuses_yield_base_and_extended_keys() {
        let form = full_form();
        let mut expected = keys_of(Tier::Base);
        expected.extend(keys_of(Tier::Extended));
        for status in ["Initiative Approved", "In Progress", "Done", "new initiative", " "] {
            let payload = select_payload(&form, status).expect("assemble");
            let keys: BTreeSet<_> = payload.keys().collect();
            assert_eq!(keys, expected, "status {status:?}");
            assert_eq!(payload.len(), FIELDS.len(), "no key collisions");
        }
    }

    #[test]
    fn introduction_is_gated_on_approval() {
        let form = full_form();
        let new = select_payload(&form, "New Initiative").expect("assemble");
        assert!(!new.contains_key("introduction"));
        let approved = select_payload(&form, "Initiative Approved").expect("assemble");
        assert_eq!(approved.get("introduction"), Some("value of introduction"));
    }

    #[test]
    fn every_schema_entry_reaches_its_payload() {
        let form = full_form();
        let base = assemble_base(&form).expect("assemble base");
        let extended = assemble_extended(&form).expect("assemble extended");
        for spec in FIELDS {
            let expected = format!("value of {}", spec.source);
            assert_eq!(extended.get(spec.key), Some(expected.as_str()), "{}", spec.key);
            if spec.tier == Tier::Base {
                assert_eq!(base.get(spec.key), Some(expected.as_str()), "{}", spec.key);
            } else {
                assert!(!base.contains_key(spec.key), "{}", spec.key);
            }
        }
    }

    #[test]
    fn renamed_keys_carry_source_values() {
        let mut form = full_form();
        form.insert("deliverydate".to_string(), "2024-06-30".to_string());
        form.insert("payimpact".to_string(), "none".to_string());
        let payload = assemble_extended(&form).expect("assemble");
        assert_eq!(payload.get("deliveryDate"), Some("2024-06-30"));
        assert_eq!(payload.get("payImpact"), Some("none"));
        assert!(!payload.contains_key("deliverydate"));
    }

    #[test]
    fn assemble_base_is_idempotent() {
        let form = full_form();
        let first = assemble_base(&form).expect("first");
        let second = assemble_base(&form).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let mut form = full_form();
        form.remove("revenue");
        assert_eq!(
            assemble_base(&form),
            Err(AssembleError::MissingField { field: "revenue" })
        );
    }

    #[test]
    fn missing_extended_field_only_matters_past_the_gate() {
        let mut form = full_form();
        form.remove("score");
        assert!(select_payload(&form, "To Do").is_ok());
        assert_eq!(
            select_payload(&form, "Initiative Approved"),
            Err(AssembleError::MissingField { field: "score" })
        );
    }

    struct CountingSource {
        inner: BTreeMap<String, String>,
        reads: Cell<usize>,
    }

    impl FieldSource for CountingSource {
        fn field(&self, name: &str) -> Option<String> {
            self.reads.set(self.reads.get() + 1);
            self.inner.field(name)
        }
    }

    #[test]
    fn fields_are_read_on_every_call() {
        let source = CountingSource {
            inner: full_form(),
            reads: Cell::new(0),
        };
        assemble_base(&source).expect("first");
        assemble_base(&source).expect("second");
        assert_eq!(source.reads.get(), 2 * keys_of(Tier::Base).len());
    }
}
