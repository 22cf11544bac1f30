//! Mismatch descriptions produced by verification and schema checks
//!
//! Each variant renders to the exact report text through `Display`.
//! Two record shapes exist: a multi-line `Key/Test/Expected/Actual` block
//! (status, text presence, extra schema fields) and a one-line
//! `Element > k <` sentence (schema type and presence).

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schema_db::SchemaType;

/// Serialized containers longer than this are cut in mismatch text.
const MAX_CONTAINER_CHARS: usize = 2048;

/// Which part of the response a schema mismatch refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Body,
    Headers,
}

impl Location {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Body => "(BODY)",
            Self::Headers => "(HEADERS)",
        }
    }
}

/// One failed expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    /// Status code differs from the expected one
    StatusCode { expected: u16, actual: u16 },
    /// Expected text is not a substring of the serialized container
    TextMissing { text: String, container: String },
    /// Unexpected text is a substring of the serialized container
    TextPresent { text: String, container: String },
    /// Container could not be serialized for text matching
    Unserializable { text: String, reason: String },
    /// Declared key present with a different type tag
    TypeMismatch {
        location: Location,
        key: String,
        expected: SchemaType,
        actual: SchemaType,
    },
    /// Declared key absent from the flattened payload
    MissingField {
        location: Location,
        key: String,
        expected: SchemaType,
    },
    /// Payload key not declared in the schema DB (exact mode only)
    ExtraField { location: Location, key: String },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StatusCode { expected, actual } => write!(
                f,
                "Key: Status Code\nTest: EQUAL\nExpected: {expected}\nActual: {actual}"
            ),
            Self::TextMissing { text, container } => write!(
                f,
                "Key: {text}\nTest: CONTAINS\nExpected: Text present\nActual: Text not found in > {} <",
                truncate(container)
            ),
            Self::TextPresent { text, container } => write!(
                f,
                "Key: {text}\nTest: NOT CONTAINS\nExpected: Text absent\nActual: Text found in > {} <",
                truncate(container)
            ),
            Self::Unserializable { text, reason } => write!(
                f,
                "Key: {text}\nTest: SERIALIZE\nExpected: Serializable container\nActual: {reason}"
            ),
            Self::TypeMismatch {
                location,
                key,
                expected,
                actual,
            } => write!(
                f,
                "{} Element > {key} < expected to be > {expected} < but actually > {actual} <",
                location.tag()
            ),
            Self::MissingField {
                location,
                key,
                expected,
            } => write!(
                f,
                "{} Element > {key} < expected to be > {expected} < but actually > missing <",
                location.tag()
            ),
            Self::ExtraField { key, .. } => write!(
                f,
                "Key: {key}\nTest: MISSING\nExpected: Element present\nActual: Element in payload but not in schema DB"
            ),
        }
    }
}

/// Cut `s` at a char boundary near [`MAX_CONTAINER_CHARS`].
fn truncate(s: &str) -> String {
    if s.len() <= MAX_CONTAINER_CHARS {
        return s.to_string();
    }
    let mut end = MAX_CONTAINER_CHARS;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…({} bytes total)", &s[..end], s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mismatch_line() {
        let m = Mismatch::TypeMismatch {
            location: Location::Body,
            key: "category.name".into(),
            expected: SchemaType::String,
            actual: SchemaType::Number,
        };
        assert_eq!(
            m.to_string(),
            "(BODY) Element > category.name < expected to be > string < but actually > number <"
        );
    }

    #[test]
    fn missing_field_line_for_headers() {
        let m = Mismatch::MissingField {
            location: Location::Headers,
            key: "content-type".into(),
            expected: SchemaType::String,
        };
        assert_eq!(
            m.to_string(),
            "(HEADERS) Element > content-type < expected to be > string < but actually > missing <"
        );
    }

    #[test]
    fn extra_field_record() {
        let m = Mismatch::ExtraField {
            location: Location::Body,
            key: "nickname".into(),
        };
        assert_eq!(
            m.to_string(),
            "Key: nickname\nTest: MISSING\nExpected: Element present\nActual: Element in payload but not in schema DB"
        );
    }

    #[test]
    fn status_record_names_both_codes() {
        let text = Mismatch::StatusCode {
            expected: 200,
            actual: 404,
        }
        .to_string();
        assert!(text.contains("Expected: 200"));
        assert!(text.contains("Actual: 404"));
    }

    #[test]
    fn long_container_is_cut_on_char_boundary() {
        let container = "é".repeat(MAX_CONTAINER_CHARS);
        let text = Mismatch::TextMissing {
            text: "x".into(),
            container,
        }
        .to_string();
        assert!(text.contains("bytes total)"));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let m = Mismatch::StatusCode {
            expected: 200,
            actual: 500,
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["kind"], "status_code");
        assert_eq!(json["actual"], 500);
    }
}
