//! Stateless execution of a `RequestSpec` through a `Transport`.
//!
//! # Design
//! `execute` is a straight pipeline: validate and serialize the spec
//! (`build_request`), send it through the transport, and lift the raw
//! response into a `ResponseResult` (`parse_response`). The two ends of
//! the pipeline are pure functions, public so they can be tested without
//! any transport at all. The executor itself holds only static
//! configuration; every call is independent, with no retries and no
//! caching.

use std::time::Duration;

use url::Url;

use crate::error::ExecuteError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestSpec, ResponseResult};
use crate::transport::{Transport, UreqTransport};

/// Bound on a whole round-trip when no explicit timeout is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes `RequestSpec`s synchronously over a `Transport`.
///
/// Holds no per-call state, so one executor can serve any number of
/// callers without coordination.
#[derive(Debug, Clone)]
pub struct RequestExecutor<T: Transport = UreqTransport> {
    transport: T,
}

impl RequestExecutor<UreqTransport> {
    /// Executor over the default ureq transport with `DEFAULT_TIMEOUT`.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Executor over the default ureq transport with an explicit bound on
    /// each round-trip.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            transport: UreqTransport::new(timeout),
        }
    }
}

impl Default for RequestExecutor<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> RequestExecutor<T> {
    /// Executor over a caller-supplied transport.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Run one request to completion.
    ///
    /// Fails with `ExecuteError::InvalidSpec` before any network I/O when
    /// the spec is unusable, and with `ExecuteError::Network` when the
    /// transport cannot complete the round-trip. Any status code the
    /// server actually produced, and any body it sent, come back as `Ok`.
    pub fn execute(&self, spec: &RequestSpec) -> Result<ResponseResult, ExecuteError> {
        let request = build_request(spec)?;
        let response = self
            .transport
            .send(&request)
            .map_err(ExecuteError::Network)?;
        Ok(parse_response(response))
    }
}

/// Validate a spec and serialize it into a wire-ready `HttpRequest`.
///
/// The URL must be non-empty, parse as an absolute URL, and use the http
/// or https scheme. A JSON body is encoded for POST only; a GET never
/// carries one. When a body is attached, a `content-type` header is added
/// unless the caller already set one.
pub fn build_request(spec: &RequestSpec) -> Result<HttpRequest, ExecuteError> {
    if spec.url.is_empty() {
        return Err(ExecuteError::InvalidSpec("url is empty".to_string()));
    }
    let url = Url::parse(&spec.url)
        .map_err(|e| ExecuteError::InvalidSpec(format!("malformed url {:?}: {e}", spec.url)))?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ExecuteError::InvalidSpec(format!(
                "unsupported scheme {scheme:?} in {:?}",
                spec.url
            )));
        }
    }

    let mut headers = spec.headers.clone();
    let body = match (spec.method, &spec.json_body) {
        (HttpMethod::Post, Some(value)) => {
            let encoded = serde_json::to_string(value)
                .map_err(|e| ExecuteError::InvalidSpec(format!("body serialization failed: {e}")))?;
            let has_content_type = headers
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
            if !has_content_type {
                headers.push(("content-type".to_string(), "application/json".to_string()));
            }
            Some(encoded)
        }
        _ => None,
    };

    Ok(HttpRequest {
        method: spec.method,
        url: spec.url.clone(),
        headers,
        body,
    })
}

/// Lift a raw response into a `ResponseResult`.
///
/// The body is kept verbatim and parsed as JSON on a best-effort basis;
/// a parse failure is recorded, never raised.
pub fn parse_response(response: HttpResponse) -> ResponseResult {
    let HttpResponse { status, body, .. } = response;
    match serde_json::from_str(&body) {
        Ok(value) => ResponseResult {
            status,
            raw_body: body,
            json: Some(value),
            parse_error: None,
        },
        Err(e) => ResponseResult {
            status,
            raw_body: body,
            json: None,
            parse_error: Some(e.to_string()),
        },
    }
}
