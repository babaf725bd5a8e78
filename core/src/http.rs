//! Request descriptions and structured results as plain data.
//!
//! # Design
//! `RequestSpec` is what callers hand to the executor: a method, an
//! absolute URL, optional headers, and an optional JSON body. The executor
//! lowers it into an `HttpRequest` (body already JSON-encoded) for the
//! transport, and lifts the transport's `HttpResponse` into a
//! `ResponseResult` with a best-effort parse of the body. All fields are
//! owned (`String`, `Vec`) so values can be moved freely between threads
//! and stored without lifetime concerns.

use serde_json::Value;

/// HTTP method for an outbound call. The supported set is closed: anything
/// else is unrepresentable rather than rejected at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Description of an outbound JSON HTTP call.
///
/// `json_body` is only meaningful for POST; a GET is sent without a body
/// regardless of what is set here. Credentials (API keys, tokens) are the
/// caller's to supply, either in `headers` or baked into `url`.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub json_body: Option<Value>,
}

impl RequestSpec {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            json_body: None,
        }
    }

    pub fn post(url: impl Into<String>, json_body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            json_body: Some(json_body),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A validated, serialized request ready for a `Transport` to send.
///
/// Produced by `executor::build_request`. The body, when present, is
/// JSON text and the headers already carry the matching content-type.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// A raw HTTP response as captured by a `Transport`.
///
/// Status and body are recorded verbatim whatever the status code;
/// interpreting 4xx/5xx is the caller's business, not the transport's.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Structured outcome of executing a `RequestSpec`.
///
/// `json` is present exactly when `raw_body` is syntactically valid JSON;
/// otherwise `parse_error` describes why parsing failed. A non-JSON body
/// is a normal, representable outcome, not an execution error.
#[derive(Debug, Clone)]
pub struct ResponseResult {
    pub status: u16,
    pub raw_body: String,
    pub json: Option<Value>,
    pub parse_error: Option<String>,
}
