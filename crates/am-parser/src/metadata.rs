use am_core::{Metadata, MetadataOccurrence};
use serde_json::Value;
use tracing::trace;

use crate::attributes::parse_attributes;

/// Decode a metadata tag payload.
///
/// Payloads containing `=` are read as attribute pairs, anything else as a
/// JSON object. Empty, unparsable and non-object payloads decode to
/// [`Metadata::Absent`].
#[must_use]
pub fn parse_metadata(payload: &str) -> Metadata {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return Metadata::Absent;
    }

    if trimmed.contains('=') {
        let attributes = parse_attributes(trimmed);
        return if attributes.is_empty() {
            Metadata::Absent
        } else {
            Metadata::Attributes(attributes)
        };
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(object)) => Metadata::Object(object),
        Ok(other) => {
            trace!(kind = json_kind(&other), "metadata payload is not a JSON object");
            Metadata::Absent
        }
        Err(error) => {
            trace!(%error, "metadata payload is not valid JSON");
            Metadata::Absent
        }
    }
}

/// The metadata occurrence closest before `target`, among those that end at
/// or before it.
#[must_use]
pub fn nearest_preceding(
    occurrences: &[MetadataOccurrence],
    target: usize,
) -> Option<&MetadataOccurrence> {
    occurrences
        .iter()
        .filter(|occurrence| occurrence.start < target && occurrence.end <= target)
        .max_by_key(|occurrence| occurrence.start)
}

/// Parsed metadata for an interactive element starting at `target`.
#[must_use]
pub fn metadata_for(occurrences: &[MetadataOccurrence], target: usize) -> Metadata {
    nearest_preceding(occurrences, target)
        .map_or(Metadata::Absent, |occurrence| parse_metadata(&occurrence.payload))
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use am_core::{Metadata, MetadataOccurrence};
    use proptest::prelude::*;
    use serde_json::json;

    use super::{metadata_for, nearest_preceding, parse_metadata};

    fn occurrence(start: usize, end: usize, payload: &str) -> MetadataOccurrence {
        MetadataOccurrence {
            start,
            end,
            payload: payload.to_string(),
        }
    }

    #[test]
    fn attribute_payload_becomes_attribute_map() {
        let metadata = parse_metadata(r#" q="A" step='2' "#);
        let Metadata::Attributes(attributes) = metadata else {
            panic!("expected attributes, got {metadata:?}");
        };
        assert_eq!(attributes["q"], "A");
        assert_eq!(attributes["step"], "2");
    }

    #[test]
    fn json_object_payload_is_kept_as_object() {
        let metadata = parse_metadata(r#"{"question": "COVERAGE", "n": 1}"#);
        assert_eq!(
            metadata.to_json(),
            json!({"question": "COVERAGE", "n": 1})
        );
    }

    #[test]
    fn empty_and_malformed_payloads_are_absent() {
        for payload in ["", "   ", "{not json", "42", "\"text\"", "null", "[1, 2]", "= ="] {
            assert_eq!(parse_metadata(payload), Metadata::Absent, "{payload:?}");
        }
    }

    #[test]
    fn nearest_preceding_requires_closed_before_target() {
        let occurrences = [
            occurrence(0, 10, r#"q="first""#),
            occurrence(20, 30, r#"q="second""#),
            occurrence(35, 50, r#"q="straddles""#),
        ];

        assert_eq!(nearest_preceding(&occurrences, 5), None);
        assert_eq!(nearest_preceding(&occurrences, 10).map(|o| o.start), Some(0));
        assert_eq!(nearest_preceding(&occurrences, 34).map(|o| o.start), Some(20));
        assert_eq!(nearest_preceding(&occurrences, 40).map(|o| o.start), Some(20));
        assert_eq!(
            metadata_for(&occurrences, 60).get("q").as_deref(),
            Some("straddles")
        );
    }

    #[test]
    fn no_occurrences_means_absent() {
        assert!(metadata_for(&[], 100).is_absent());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_parse_metadata_never_panics(payload in ".{0,128}") {
            let _ = parse_metadata(&payload);
        }
    }
}
