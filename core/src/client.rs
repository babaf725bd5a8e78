//! Stateless clients for the two upstream APIs the scan flow calls.
//!
//! # Design
//! Each client only knows how to describe its requests and interpret its
//! responses: `build_*` produces a `RequestSpec`, `parse_*` consumes a
//! `ResponseResult`. Running the request is the executor's job, so these
//! clients stay deterministic and free of I/O. Credentials and identity
//! (API key, user agent) are constructor arguments supplied by the
//! caller — nothing is compiled in.

use serde_json::Value;

use crate::error::ApiError;
use crate::http::{RequestSpec, ResponseResult};
use crate::types::{extract_json, GenerateRequest, GenerateResponse, LookupEnvelope, Product};

/// Base URL of the food-product lookup service.
pub const OPEN_FOOD_FACTS_URL: &str = "https://world.openfoodfacts.org";
/// Base URL of the cosmetics-product lookup service.
pub const OPEN_BEAUTY_FACTS_URL: &str = "https://world.openbeautyfacts.org";
/// Base URL of the generative-language service.
pub const GENERATIVE_LANGUAGE_URL: &str = "https://generativelanguage.googleapis.com";

/// What kind of product a barcode scan is for. Picks the upstream database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCategory {
    Food,
    Cosmetics,
}

impl ScanCategory {
    pub fn base_url(self) -> &'static str {
        match self {
            ScanCategory::Food => OPEN_FOOD_FACTS_URL,
            ScanCategory::Cosmetics => OPEN_BEAUTY_FACTS_URL,
        }
    }
}

/// Client for barcode lookups against an Open Food Facts style API.
#[derive(Debug, Clone)]
pub struct ProductClient {
    base_url: String,
    user_agent: Option<String>,
}

impl ProductClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: None,
        }
    }

    pub fn for_category(category: ScanCategory) -> Self {
        Self::new(category.base_url())
    }

    /// The lookup service asks clients to identify themselves; the value
    /// is sent as the `user-agent` header on every built request.
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    pub fn build_lookup(&self, barcode: &str) -> RequestSpec {
        let spec = RequestSpec::get(format!("{}/api/v2/product/{barcode}", self.base_url));
        match &self.user_agent {
            Some(user_agent) => spec.with_header("user-agent", user_agent),
            None => spec,
        }
    }

    /// Interpret a lookup response.
    ///
    /// The service reports an unknown barcode either as a 404 or as a 200
    /// envelope without a `product`; both come back as `NotFound`.
    pub fn parse_lookup(&self, result: ResponseResult) -> Result<Product, ApiError> {
        let envelope: LookupEnvelope = decode(result)?;
        envelope.product.ok_or(ApiError::NotFound)
    }
}

/// Client for `models/{model}:generateContent` on a Gemini-style API.
///
/// The API key travels in the `key` query parameter, which is how the
/// service authenticates simple server-side callers.
#[derive(Debug, Clone)]
pub struct GenerateClient {
    base_url: String,
    model: String,
    api_key: String,
}

impl GenerateClient {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn build_generate(&self, request: &GenerateRequest) -> Result<RequestSpec, ApiError> {
        let body =
            serde_json::to_value(request).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(RequestSpec::post(
            format!(
                "{}/v1beta/models/{}:generateContent?key={}",
                self.base_url, self.model, self.api_key
            ),
            body,
        ))
    }

    /// Extract the generated text from a response.
    pub fn parse_generate(&self, result: ResponseResult) -> Result<String, ApiError> {
        let reply: GenerateResponse = decode(result)?;
        reply
            .first_text()
            .map(str::to_string)
            .ok_or(ApiError::EmptyResponse)
    }

    /// Extract the generated text and read it as a JSON value, stripping
    /// the code fences models wrap "JSON only" replies in.
    pub fn parse_generate_json(&self, result: ResponseResult) -> Result<Value, ApiError> {
        let text = self.parse_generate(result)?;
        extract_json(&text).ok_or_else(|| {
            ApiError::DeserializationError(format!("reply is not valid JSON: {text:?}"))
        })
    }
}

/// Shared status handling and body decoding for both clients: 404 maps to
/// `NotFound`, any other non-200 to `HttpError`, and only a 200 with a
/// JSON body gets deserialized.
fn decode<T: serde::de::DeserializeOwned>(result: ResponseResult) -> Result<T, ApiError> {
    if result.status == 404 {
        return Err(ApiError::NotFound);
    }
    if result.status != 200 {
        return Err(ApiError::HttpError {
            status: result.status,
            body: result.raw_body,
        });
    }
    let value = result.json.ok_or_else(|| {
        ApiError::DeserializationError(
            result
                .parse_error
                .unwrap_or_else(|| "body is not JSON".to_string()),
        )
    })?;
    serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::executor::parse_response;
    use crate::http::{HttpMethod, HttpResponse};
    use crate::types::GenerationConfig;

    fn result_from(status: u16, body: &str) -> ResponseResult {
        parse_response(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        })
    }

    // --- product lookup ---

    #[test]
    fn build_lookup_produces_correct_request() {
        let client = ProductClient::new("http://localhost:3000");
        let spec = client.build_lookup("737628064502");
        assert_eq!(spec.method, HttpMethod::Get);
        assert_eq!(spec.url, "http://localhost:3000/api/v2/product/737628064502");
        assert!(spec.json_body.is_none());
        assert!(spec.headers.is_empty());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = ProductClient::new("http://localhost:3000/");
        let spec = client.build_lookup("1");
        assert_eq!(spec.url, "http://localhost:3000/api/v2/product/1");
    }

    #[test]
    fn for_category_picks_the_right_database() {
        assert_eq!(
            ProductClient::for_category(ScanCategory::Food)
                .build_lookup("1")
                .url,
            format!("{OPEN_FOOD_FACTS_URL}/api/v2/product/1")
        );
        assert_eq!(
            ProductClient::for_category(ScanCategory::Cosmetics)
                .build_lookup("1")
                .url,
            format!("{OPEN_BEAUTY_FACTS_URL}/api/v2/product/1")
        );
    }

    #[test]
    fn user_agent_is_attached_when_configured() {
        let client =
            ProductClient::new("http://localhost:3000").with_user_agent("prodscan/0.1 (tests)");
        let spec = client.build_lookup("1");
        assert_eq!(
            spec.headers,
            vec![("user-agent".to_string(), "prodscan/0.1 (tests)".to_string())]
        );
    }

    #[test]
    fn parse_lookup_success() {
        let body = r#"{"status":1,"product":{"product_name":"Thai peanut noodle kit","brands":"Simply Asia"}}"#;
        let client = ProductClient::new("http://localhost:3000");
        let product = client.parse_lookup(result_from(200, body)).unwrap();
        assert_eq!(product.display_name(), "Thai peanut noodle kit");
        assert_eq!(product.brands.as_deref(), Some("Simply Asia"));
    }

    #[test]
    fn parse_lookup_404_is_not_found() {
        let client = ProductClient::new("http://localhost:3000");
        let err = client
            .parse_lookup(result_from(404, r#"{"status":0,"status_verbose":"product not found"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_lookup_envelope_without_product_is_not_found() {
        let client = ProductClient::new("http://localhost:3000");
        let err = client
            .parse_lookup(result_from(200, r#"{"status":0}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_lookup_unexpected_status() {
        let client = ProductClient::new("http://localhost:3000");
        let err = client
            .parse_lookup(result_from(503, "upstream down"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 503, .. }));
    }

    #[test]
    fn parse_lookup_non_json_body() {
        let client = ProductClient::new("http://localhost:3000");
        let err = client
            .parse_lookup(result_from(200, "<html>gateway error</html>"))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    // --- generation ---

    fn generate_client() -> GenerateClient {
        GenerateClient::new("http://localhost:3000", "gemini-2.5-flash", "test-key")
    }

    #[test]
    fn build_generate_produces_correct_request() {
        let request = GenerateRequest::from_text("Say hello").with_config(GenerationConfig {
            temperature: Some(0.1),
            max_output_tokens: Some(200),
        });
        let spec = generate_client().build_generate(&request).unwrap();
        assert_eq!(spec.method, HttpMethod::Post);
        assert_eq!(
            spec.url,
            "http://localhost:3000/v1beta/models/gemini-2.5-flash:generateContent?key=test-key"
        );
        let body = spec.json_body.unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Say hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 200);
    }

    #[test]
    fn parse_generate_returns_first_text() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"hello there"}]}}]}"#;
        let text = generate_client().parse_generate(result_from(200, body)).unwrap();
        assert_eq!(text, "hello there");
    }

    #[test]
    fn parse_generate_no_candidates_is_empty_response() {
        let err = generate_client()
            .parse_generate(result_from(200, r#"{"candidates":[]}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::EmptyResponse));
    }

    #[test]
    fn parse_generate_bad_key_surfaces_status() {
        let body = r#"{"error":{"code":400,"message":"API key not valid"}}"#;
        let err = generate_client()
            .parse_generate(result_from(400, body))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 400, .. }));
    }

    #[test]
    fn parse_generate_json_strips_fences() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"```json\n{\"summary\":\"low risk\"}\n```"}]}}]}"#;
        let value = generate_client()
            .parse_generate_json(result_from(200, body))
            .unwrap();
        assert_eq!(value, json!({"summary": "low risk"}));
    }

    #[test]
    fn parse_generate_json_rejects_prose() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"I cannot answer that"}]}}]}"#;
        let err = generate_client()
            .parse_generate_json(result_from(200, body))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
