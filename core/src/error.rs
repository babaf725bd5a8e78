//! Error types for request execution and the typed API clients.
//!
//! # Design
//! Two layers with distinct failure vocabularies. `ExecuteError` covers the
//! executor itself and has exactly two kinds: a spec that never deserves a
//! network call, and a transport that failed to complete one. A non-2xx
//! status or a non-JSON body is data, not an `ExecuteError`. `ApiError` is
//! the vocabulary of the typed clients, which do care about status codes
//! and response shape.

use std::fmt;

use crate::transport::TransportError;

/// Errors returned by `RequestExecutor::execute`.
#[derive(Debug)]
pub enum ExecuteError {
    /// The request description is unusable: empty or malformed URL,
    /// unsupported scheme, or a body that cannot be JSON-encoded.
    /// The transport is never invoked.
    InvalidSpec(String),

    /// The transport could not complete the round-trip (DNS failure,
    /// connection refused, timeout). Carries the underlying cause.
    Network(TransportError),
}

impl fmt::Display for ExecuteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecuteError::InvalidSpec(msg) => write!(f, "invalid request: {msg}"),
            ExecuteError::Network(source) => write!(f, "network failure: {source}"),
        }
    }
}

impl std::error::Error for ExecuteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecuteError::InvalidSpec(_) => None,
            ExecuteError::Network(source) => Some(source.as_ref()),
        }
    }
}

/// Errors returned by `ProductClient` and `GenerateClient` parse methods.
///
/// `NotFound` gets a dedicated variant because callers routinely branch on
/// "unknown barcode" versus "the upstream misbehaved." Everything else
/// non-2xx lands in `HttpError` with the raw status and body for debugging.
#[derive(Debug)]
pub enum ApiError {
    /// The upstream reported that the requested resource does not exist.
    NotFound,

    /// The upstream returned an unexpected status.
    HttpError { status: u16, body: String },

    /// A generation reply arrived without any text candidate.
    EmptyResponse,

    /// The response body could not be read as the expected shape.
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    SerializationError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "resource not found"),
            ApiError::HttpError { status, body } => write!(f, "HTTP {status}: {body}"),
            ApiError::EmptyResponse => write!(f, "response contained no generated text"),
            ApiError::DeserializationError(msg) => write!(f, "deserialization failed: {msg}"),
            ApiError::SerializationError(msg) => write!(f, "serialization failed: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
