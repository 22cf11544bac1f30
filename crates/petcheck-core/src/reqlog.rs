//! Per-suite request log
//!
//! Every request/response pair is appended to `<dir>/<suite>.log` as a
//! rebuilt `curl` command plus the response details, for post-hoc
//! debugging of failed scenarios.
//!
//! ```text
//! .petcheck/logs/
//! ├── pet.log
//! ├── store.log
//! └── user.log
//! ```

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::http::{ApiRequest, ApiResponse};

/// Headers that should be masked in logs.
const SENSITIVE_HEADERS: &[&str] = &[
    "api_key",
    "authorization",
    "x-api-key",
    "x-auth-token",
    "cookie",
    "set-cookie",
    "proxy-authorization",
];

/// Mask value for redacted headers.
const MASK: &str = "***";

/// Response bodies longer than this are cut in the log.
const MAX_BODY_BYTES: usize = 4096;

/// Maximum characters kept from the suite name in the filename.
const MAX_FILENAME_LEN: usize = 200;

/// Append-only log destination for one suite.
#[derive(Debug, Clone)]
pub struct RequestLog {
    path: PathBuf,
    mask_headers: bool,
}

impl RequestLog {
    /// Create the log directory if needed; the file is created on first write.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    pub fn new(dir: &Path, suite: &str, mask_headers: bool) -> Result<Self, LogError> {
        std::fs::create_dir_all(dir)
            .map_err(|e| LogError::Io(format!("create {}: {e}", dir.display())))?;
        Ok(Self {
            path: dir.join(log_filename(suite)),
            mask_headers,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one request/response record.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened or written.
    pub fn record(
        &self,
        base_url: &str,
        request: &ApiRequest,
        response: &ApiResponse,
    ) -> Result<(), LogError> {
        let entry = format_record(base_url, request, response, self.mask_headers);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LogError::Io(format!("open {}: {e}", self.path.display())))?;
        file.write_all(entry.as_bytes())
            .map_err(|e| LogError::Io(format!("write {}: {e}", self.path.display())))
    }
}

/// Render one log record.
#[must_use]
pub fn format_record(
    base_url: &str,
    request: &ApiRequest,
    response: &ApiResponse,
    mask_headers: bool,
) -> String {
    let mut lines = Vec::new();
    lines.push(format!("### {}", request.label()));
    lines.push(format!("URL: {}", request.url(base_url)));
    lines.push(format!("Duration: {:.3}s", response.elapsed));
    lines.push("Request:".to_string());
    lines.push(to_curl(base_url, request, mask_headers));
    lines.push(format!("Response status: {}", response.status_code));
    lines.push("Response headers:".to_string());
    for (key, value) in &response.headers {
        let value = if mask_headers && is_sensitive_header(key) {
            MASK
        } else {
            value.as_str()
        };
        lines.push(format!("  {key}: {value}"));
    }
    lines.push("Response body:".to_string());
    lines.push(truncate_body(&response.text));
    lines.push(String::new());
    lines.push(String::new());
    lines.join("\n")
}

/// Rebuild the request as a `curl` command line.
#[must_use]
pub fn to_curl(base_url: &str, request: &ApiRequest, mask_headers: bool) -> String {
    let mut parts = vec![format!(
        "curl -X {} {}",
        request.method,
        shell_quote(&request.url(base_url))
    )];

    for (key, value) in &request.headers {
        let value = if mask_headers && is_sensitive_header(key) {
            MASK
        } else {
            value.as_str()
        };
        parts.push(format!("-H {}", shell_quote(&format!("{key}: {value}"))));
    }

    if let Some(body) = &request.body {
        if !request
            .headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case("content-type"))
        {
            parts.push(format!("-H {}", shell_quote("Content-Type: application/json")));
        }
        parts.push(format!("-d {}", shell_quote(&body.to_string())));
    }

    parts.join(" \\\n  ")
}

/// Single-quote for POSIX shells: `it's` → `'it'\''s'`.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

fn is_sensitive_header(name: &str) -> bool {
    SENSITIVE_HEADERS
        .iter()
        .any(|&h| name.eq_ignore_ascii_case(h))
}

fn truncate_body(text: &str) -> String {
    if text.len() <= MAX_BODY_BYTES {
        return text.to_string();
    }
    let mut end = MAX_BODY_BYTES;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…({} bytes total)", &text[..end], text.len())
}

/// "store orders" → "store_orders.log"
fn log_filename(suite: &str) -> String {
    let sanitized: String = suite
        .chars()
        .take(MAX_FILENAME_LEN)
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '.' => c,
            _ => '_',
        })
        .collect();
    format!("{sanitized}.log")
}

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(String),
}
