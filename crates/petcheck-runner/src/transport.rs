//! HTTP transport: sends an [`ApiRequest`], returns an [`ApiResponse`]
//!
//! Network failures are returned as-is; verification only ever sees
//! responses that actually arrived.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use petcheck_core::{ApiRequest, ApiResponse, Config};

/// Anything that can execute a request against the service under test.
pub trait Transport {
    /// Base URL requests are resolved against.
    fn base_url(&self) -> &str;

    /// The request as it goes on the wire, with transport defaults merged
    /// in. This is what the request log records.
    fn prepare(&self, request: &ApiRequest) -> ApiRequest {
        request.clone()
    }

    /// Send one request.
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be built or the exchange fails.
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Blocking reqwest transport with configured default headers.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    headers: HashMap<String, String>,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers: config.headers.clone(),
        })
    }
}

impl Transport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn prepare(&self, request: &ApiRequest) -> ApiRequest {
        request.clone().with_default_headers(&self.headers)
    }

    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let request = &self.prepare(request);
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| TransportError::Method(request.method.clone()))?;
        let url = format!("{}{}", self.base_url, request.endpoint);

        let mut req = self.client.request(method, &url);
        for (k, v) in &request.headers {
            req = req.header(k, v);
        }
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let start = Instant::now();
        let resp = req
            .send()
            .map_err(|e| TransportError::Http(format!("{}: {e}", request.label())))?;

        let status_code = resp.status().as_u16();
        let headers: BTreeMap<String, String> = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let text = resp
            .text()
            .map_err(|e| TransportError::Http(format!("{}: {e}", request.label())))?;
        let elapsed = start.elapsed().as_secs_f64();

        Ok(ApiResponse::from_parts(status_code, headers, text, elapsed))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("invalid HTTP method '{0}'")]
    Method(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let config = Config {
            base_url: "http://localhost:8080/v2/".into(),
            ..Config::default()
        };
        let t = HttpTransport::from_config(&config).unwrap();
        assert_eq!(t.base_url(), "http://localhost:8080/v2");
    }

    #[test]
    fn prepare_merges_configured_headers() {
        let t = HttpTransport::from_config(&Config::default()).unwrap();
        let prepared = t.prepare(&ApiRequest::get("/user/logout"));
        assert_eq!(prepared.headers["api_key"], "special-key");

        let prepared = t.prepare(&ApiRequest::get("/user/logout").with_header("Api_Key", "mine"));
        assert_eq!(prepared.headers.len(), 1);
        assert_eq!(prepared.headers["Api_Key"], "mine");
    }

    /// Accept one connection, answer `{}`, and hand back the raw request head.
    fn serve_once() -> (String, std::thread::JoinHandle<String>) {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/v2", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            stream
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}",
                )
                .unwrap();
            String::from_utf8_lossy(&head).to_ascii_lowercase()
        });
        (base_url, handle)
    }

    #[test]
    fn wire_carries_each_header_once() {
        let (base_url, server) = serve_once();
        let config = Config {
            base_url,
            timeout_secs: 5,
            ..Config::default()
        };
        let t = HttpTransport::from_config(&config).unwrap();
        let resp = t
            .send(&ApiRequest::get("/user/logout").with_header("api_key", "override"))
            .unwrap();
        assert_eq!(resp.status_code, 200);

        let head = server.join().unwrap();
        assert_eq!(head.matches("api_key:").count(), 1);
        assert!(head.contains("api_key: override"));
    }

    #[test]
    fn invalid_method_rejected_before_sending() {
        let t = HttpTransport::from_config(&Config::default()).unwrap();
        let req = ApiRequest::new("BAD METHOD", "/pet");
        assert!(matches!(t.send(&req), Err(TransportError::Method(_))));
    }

    #[test]
    fn connection_refused_is_http_error() {
        let config = Config {
            base_url: "http://127.0.0.1:1".into(),
            timeout_secs: 1,
            ..Config::default()
        };
        let t = HttpTransport::from_config(&config).unwrap();
        let err = t.send(&ApiRequest::get("/pet/1")).unwrap_err();
        assert!(matches!(err, TransportError::Http(msg) if msg.starts_with("GET /pet/1")));
    }
}
