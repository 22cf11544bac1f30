//! Response verification: primitives and the multi-point verifier
//!
//! No I/O, never fails. Every active check runs and contributes its
//! mismatches, so one call surfaces all independent problems.

use serde::Serialize;

use crate::http::ApiResponse;
use crate::mismatch::Mismatch;
use crate::report::Report;

/// One mismatch iff `actual != expected`.
#[must_use]
pub fn verify_status_code(expected: u16, actual: u16) -> Vec<Mismatch> {
    if actual == expected {
        Vec::new()
    } else {
        vec![Mismatch::StatusCode { expected, actual }]
    }
}

/// One mismatch per text that is NOT a literal substring of the
/// serialized `container`.
#[must_use]
pub fn verify_expected_text<S, T>(expected: &[S], container: &T) -> Vec<Mismatch>
where
    S: AsRef<str>,
    T: Serialize + ?Sized,
{
    check_presence(expected, container, true)
}

/// One mismatch per text that IS a literal substring of the serialized
/// `container`.
#[must_use]
pub fn verify_unexpected_text<S, T>(unexpected: &[S], container: &T) -> Vec<Mismatch>
where
    S: AsRef<str>,
    T: Serialize + ?Sized,
{
    check_presence(unexpected, container, false)
}

fn check_presence<S, T>(texts: &[S], container: &T, want_present: bool) -> Vec<Mismatch>
where
    S: AsRef<str>,
    T: Serialize + ?Sized,
{
    if texts.is_empty() {
        return Vec::new();
    }
    let serialized = match serde_json::to_string(container) {
        Ok(s) => s,
        Err(e) => {
            return texts
                .iter()
                .map(|t| Mismatch::Unserializable {
                    text: t.as_ref().to_string(),
                    reason: e.to_string(),
                })
                .collect();
        }
    };

    texts
        .iter()
        .map(|t| t.as_ref())
        .filter(|text| serialized.contains(*text) != want_present)
        .map(|text| {
            if want_present {
                Mismatch::TextMissing {
                    text: text.to_string(),
                    container: serialized.clone(),
                }
            } else {
                Mismatch::TextPresent {
                    text: text.to_string(),
                    container: serialized.clone(),
                }
            }
        })
        .collect()
}

/// The seven optional checks of one multi-point verification.
///
/// Unset checks are skipped, not failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expectations {
    pub status_code: Option<u16>,
    pub expected_json_texts: Option<Vec<String>>,
    pub unexpected_json_texts: Option<Vec<String>>,
    pub expected_header_texts: Option<Vec<String>>,
    pub unexpected_header_texts: Option<Vec<String>>,
    pub expected_body_texts: Option<Vec<String>>,
    pub unexpected_body_texts: Option<Vec<String>>,
}

fn owned<I>(texts: I) -> Option<Vec<String>>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    Some(texts.into_iter().map(Into::into).collect())
}

impl Expectations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    #[must_use]
    pub fn expect_json<I>(mut self, texts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.expected_json_texts = owned(texts);
        self
    }

    #[must_use]
    pub fn reject_json<I>(mut self, texts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.unexpected_json_texts = owned(texts);
        self
    }

    #[must_use]
    pub fn expect_headers<I>(mut self, texts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.expected_header_texts = owned(texts);
        self
    }

    #[must_use]
    pub fn reject_headers<I>(mut self, texts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.unexpected_header_texts = owned(texts);
        self
    }

    #[must_use]
    pub fn expect_body<I>(mut self, texts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.expected_body_texts = owned(texts);
        self
    }

    #[must_use]
    pub fn reject_body<I>(mut self, texts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.unexpected_body_texts = owned(texts);
        self
    }
}

/// Run every configured check against `response`.
///
/// Order: status, JSON expected/unexpected, header expected/unexpected,
/// text-body expected/unexpected. The JSON and text-body families both
/// match against the serialized decoded body, not the raw text.
#[must_use]
pub fn multi_point_verification(response: &ApiResponse, expect: &Expectations) -> Report {
    let mut mismatches = Vec::new();

    if let Some(code) = expect.status_code {
        mismatches.extend(verify_status_code(code, response.status_code));
    }
    if let Some(texts) = &expect.expected_json_texts {
        mismatches.extend(verify_expected_text(texts.as_slice(), &response.body));
    }
    if let Some(texts) = &expect.unexpected_json_texts {
        mismatches.extend(verify_unexpected_text(texts.as_slice(), &response.body));
    }
    if let Some(texts) = &expect.expected_header_texts {
        mismatches.extend(verify_expected_text(texts.as_slice(), &response.headers));
    }
    if let Some(texts) = &expect.unexpected_header_texts {
        mismatches.extend(verify_unexpected_text(texts.as_slice(), &response.headers));
    }
    if let Some(texts) = &expect.expected_body_texts {
        mismatches.extend(verify_expected_text(texts.as_slice(), &response.body));
    }
    if let Some(texts) = &expect.unexpected_body_texts {
        mismatches.extend(verify_unexpected_text(texts.as_slice(), &response.body));
    }

    Report::new(mismatches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::NO_MISMATCH;
    use serde_json::json;

    #[test]
    fn status_equal_is_empty() {
        assert!(verify_status_code(200, 200).is_empty());
    }

    #[test]
    fn status_differs_is_one_entry() {
        let m = verify_status_code(200, 404);
        assert_eq!(m.len(), 1);
        let text = m[0].to_string();
        assert!(text.contains("200") && text.contains("404"));
    }

    #[test]
    fn expected_text_found_in_compact_json() {
        let body = json!({"id": 123, "name": "rex"});
        assert!(verify_expected_text(&["\"id\":123"], &body).is_empty());
        assert!(verify_unexpected_text(&["\"name\":\"rex\""], &body).len() == 1);
    }

    #[test]
    fn expected_text_missing_keeps_input_order() {
        let body = json!({"id": 1});
        let m = verify_expected_text(&["zzz", "\"id\":1", "yyy"], &body);
        assert_eq!(m.len(), 2);
        assert!(matches!(&m[0], Mismatch::TextMissing { text, .. } if text == "zzz"));
        assert!(matches!(&m[1], Mismatch::TextMissing { text, .. } if text == "yyy"));
    }

    #[test]
    fn matching_is_literal() {
        let body = json!({"name": "a.c"});
        // '.' is not a wildcard
        assert_eq!(verify_expected_text(&["abc"], &body).len(), 1);
        // case is significant
        assert_eq!(verify_expected_text(&["A.C"], &body).len(), 1);
    }

    #[test]
    fn serialization_preserves_insertion_order() {
        let mut obj = serde_json::Map::new();
        obj.insert("zeta".into(), json!(1));
        obj.insert("alpha".into(), json!(2));
        let body = serde_json::Value::Object(obj);
        assert!(verify_expected_text(&["{\"zeta\":1,\"alpha\":2}"], &body).is_empty());
    }

    #[test]
    fn unserializable_container_reported() {
        use std::collections::HashMap;
        let bad: HashMap<(u8, u8), u8> = HashMap::from([((1, 2), 3)]);
        let m = verify_expected_text(&["x"], &bad);
        assert!(matches!(&m[0], Mismatch::Unserializable { .. }));
    }

    #[test]
    fn status_only_failure_surfaces_once() {
        let resp = ApiResponse::json(404, json!({"ok": true}));
        let expect = Expectations::new().status(200).expect_json(["\"ok\""]);
        let report = multi_point_verification(&resp, &expect);
        assert_eq!(report.len(), 1);
        assert!(matches!(
            report.mismatches[0],
            Mismatch::StatusCode {
                expected: 200,
                actual: 404
            }
        ));
        assert!(report.compile().contains("Total mismatches: 1"));
    }

    #[test]
    fn no_checks_is_pass() {
        let resp = ApiResponse::json(500, json!({}));
        assert_eq!(
            multi_point_verification(&resp, &Expectations::new()).compile(),
            NO_MISMATCH
        );
    }

    #[test]
    fn all_families_run_in_category_order() {
        let resp = ApiResponse::json(500, json!({"message": "boom"}));
        let expect = Expectations::new()
            .status(200)
            .expect_json(["\"id\""])
            .reject_json(["boom"])
            .expect_headers(["x-rate-limit"])
            .reject_headers(["application/json"])
            .expect_body(["\"name\""])
            .reject_body(["message"]);
        let report = multi_point_verification(&resp, &expect);
        let kinds: Vec<&str> = report
            .mismatches
            .iter()
            .map(|m| match m {
                Mismatch::StatusCode { .. } => "status",
                Mismatch::TextMissing { text, .. } | Mismatch::TextPresent { text, .. } => {
                    text.as_str()
                }
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "status",
                "\"id\"",
                "boom",
                "x-rate-limit",
                "application/json",
                "\"name\"",
                "message"
            ]
        );
    }

    #[test]
    fn header_checks_see_header_map() {
        let resp = ApiResponse::json(200, json!({})).with_header("X-Expires-After", "soon");
        let expect = Expectations::new().expect_headers(["\"x-expires-after\":\"soon\""]);
        assert!(multi_point_verification(&resp, &expect).is_pass());
    }

    // Text-body checks match the serialized decoded body, exactly like the
    // JSON checks; they never look at `response.text`.
    #[test]
    fn text_body_checks_use_decoded_body() {
        let mut resp = ApiResponse::json(200, json!({"name": "rex"}));
        resp.text = "raw text that differs".into();

        let json_side = Expectations::new().expect_json(["raw text"]);
        let text_side = Expectations::new().expect_body(["raw text"]);
        assert_eq!(multi_point_verification(&resp, &json_side).len(), 1);
        assert_eq!(multi_point_verification(&resp, &text_side).len(), 1);

        let both = Expectations::new()
            .expect_json(["\"name\":\"rex\""])
            .expect_body(["\"name\":\"rex\""]);
        assert!(multi_point_verification(&resp, &both).is_pass());
    }

    #[test]
    fn non_json_body_is_matched_as_json_string() {
        let resp = ApiResponse::from_parts(
            404,
            std::collections::BTreeMap::new(),
            "Pet not found".into(),
            0.0,
        );
        let expect = Expectations::new()
            .status(404)
            .expect_body(["\"Pet not found\""]);
        assert!(multi_point_verification(&resp, &expect).is_pass());
    }
}
