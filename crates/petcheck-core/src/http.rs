//! Request and response shapes shared by the transport, the request log
//! and the verifiers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An HTTP request against the service under test.
///
/// `endpoint` is the concrete path (`/pet/42`), appended to the base URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    pub method: String,
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: &str, endpoint: impl Into<String>) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            endpoint: endpoint.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new("GET", endpoint)
    }

    #[must_use]
    pub fn post(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new("POST", endpoint).with_body(body)
    }

    #[must_use]
    pub fn put(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new("PUT", endpoint).with_body(body)
    }

    #[must_use]
    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new("DELETE", endpoint)
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Fill in `defaults` for headers the request does not set itself.
    /// Names compare case-insensitively and the request's own value wins.
    #[must_use]
    pub fn with_default_headers<'a, I>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, value) in defaults {
            if !self.headers.keys().any(|k| k.eq_ignore_ascii_case(key)) {
                self.headers.insert(key.clone(), value.clone());
            }
        }
        self
    }

    /// Operation label, e.g. "GET /pet/42"
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.endpoint)
    }

    /// Full URL including the query string. Query values are not encoded.
    #[must_use]
    pub fn url(&self, base_url: &str) -> String {
        let mut url = format!("{}{}", base_url.trim_end_matches('/'), self.endpoint);
        for (idx, (k, v)) in self.query.iter().enumerate() {
            url.push(if idx == 0 { '?' } else { '&' });
            url.push_str(k);
            url.push('=');
            url.push_str(v);
        }
        url
    }
}

/// An already-received response. Transport failures never reach this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status_code: u16,
    /// Decoded JSON body, or the raw text as a JSON string when it is not JSON
    pub body: Value,
    /// Header names are lowercase
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Raw body text
    #[serde(default)]
    pub text: String,
    /// Round-trip time in seconds
    #[serde(default)]
    pub elapsed: f64,
}

impl ApiResponse {
    /// Build a response from wire parts, decoding the body when it is JSON.
    #[must_use]
    pub fn from_parts(
        status_code: u16,
        headers: BTreeMap<String, String>,
        text: String,
        elapsed: f64,
    ) -> Self {
        let body = serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.clone()));
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        Self {
            status_code,
            body,
            headers,
            text,
            elapsed,
        }
    }

    /// Convenience constructor for a JSON body.
    #[must_use]
    pub fn json(status_code: u16, body: Value) -> Self {
        let text = body.to_string();
        let headers = BTreeMap::from([("content-type".to_string(), "application/json".to_string())]);
        Self {
            status_code,
            body,
            headers,
            text,
            elapsed: 0.0,
        }
    }

    #[must_use]
    pub fn with_header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.insert(key.to_ascii_lowercase(), value.into());
        self
    }

    /// Headers as a JSON object, for schema validation.
    #[must_use]
    pub fn headers_json(&self) -> Value {
        Value::Object(
            self.headers
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}
