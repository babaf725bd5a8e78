//! The network boundary behind request execution.
//!
//! # Design
//! `Transport` is the one seam that touches the wire: it takes a fully
//! serialized `HttpRequest` and returns whatever the server sent back,
//! failing only on transport-level problems. Status interpretation and
//! body parsing stay above this trait, which keeps it trivial to mock.
//! `UreqTransport` is the default implementation; it disables ureq's
//! status-code-as-error behavior so 4xx/5xx responses come back as data.

use std::time::Duration;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// A transport-level failure: DNS, connect, timeout, truncated body.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// The underlying network-call mechanism. Implementations send exactly one
/// request per call and must not retry.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// A shared reference sends the same way the owned transport does. Lets a
/// test keep hold of a mock while an executor borrows it.
impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// Synchronous transport over a configured `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Build a transport whose calls are bounded by `timeout` end to end.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut response = match (request.method, &request.body) {
            (HttpMethod::Get, _) => {
                let mut call = self.agent.get(&request.url);
                for (name, value) in &request.headers {
                    call = call.header(name.as_str(), value.as_str());
                }
                call.call()?
            }
            (HttpMethod::Post, Some(body)) => {
                let mut call = self.agent.post(&request.url);
                for (name, value) in &request.headers {
                    call = call.header(name.as_str(), value.as_str());
                }
                call.send(body.as_bytes())?
            }
            (HttpMethod::Post, None) => {
                let mut call = self.agent.post(&request.url);
                for (name, value) in &request.headers {
                    call = call.header(name.as_str(), value.as_str());
                }
                call.send_empty()?
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
