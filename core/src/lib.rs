//! Synchronous JSON-over-HTTP core for the product scan service.
//!
//! # Overview
//! One generic operation underlies everything the scan flow does against
//! its upstream APIs: describe an HTTP call as data (`RequestSpec`), run
//! it through a bounded synchronous transport, and get back the status,
//! the verbatim body, and a best-effort JSON parse (`ResponseResult`).
//! `RequestExecutor` implements that operation; `ProductClient` and
//! `GenerateClient` are thin typed layers on top for the barcode-lookup
//! and content-generation services.
//!
//! # Design
//! - The executor is stateless between calls; it holds only its transport
//!   and the transport's timeout.
//! - `Transport` is the single seam that touches the network, so every
//!   piece of request building and response interpretation is testable
//!   with plain data.
//! - HTTP error statuses and non-JSON bodies are ordinary results, not
//!   errors. Only an unusable spec or a failed round-trip is an error.
//! - Clients follow a `build_*` / `parse_*` split and never perform I/O
//!   themselves.

pub mod client;
pub mod error;
pub mod executor;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{
    GenerateClient, ProductClient, ScanCategory, GENERATIVE_LANGUAGE_URL, OPEN_BEAUTY_FACTS_URL,
    OPEN_FOOD_FACTS_URL,
};
pub use error::{ApiError, ExecuteError};
pub use executor::{build_request, parse_response, RequestExecutor, DEFAULT_TIMEOUT};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestSpec, ResponseResult};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{
    extract_json, Candidate, Content, GenerateRequest, GenerateResponse, GenerationConfig,
    InlineData, LookupEnvelope, Macros, Nutriments, Part, Product,
};
