//! Browse links for tracker issues.
//!
//! The tracker reports a REST `self` URL; the browse page lives under the same
//! prefix. The prefix is everything before the first `rest` in the URL.

const REST_MARKER: &str = "rest";

/// Derive `<prefix>browse/<key>` from a tracker `self` URL.
///
/// A URL without `rest` is used whole as the prefix.
pub fn browse_link(self_url: &str, key: &str) -> String {
    let occurrences = self_url.matches(REST_MARKER).count();
    if occurrences != 1 {
        tracing::warn!(
            self_url,
            occurrences,
            "tracker self URL does not contain exactly one `rest` segment; browse link may be wrong"
        );
    }
    let prefix = match self_url.find(REST_MARKER) {
        Some(index) => &self_url[..index],
        None => self_url,
    };
    format!("{prefix}browse/{key}")
}
