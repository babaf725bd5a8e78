//! DTOs for the product-lookup and generateContent APIs.
//!
//! # Design
//! Both upstream services are third-party: their payloads are large and
//! drift over time. These types deserialize leniently — every field is
//! defaulted, unknown fields are ignored — and accessor methods encode the
//! fallback chains the upstream data actually needs (`product_name` vs
//! `product_name_en`, per-100g nutriments vs per-serving). Wire field
//! names follow each API's own convention: snake_case tags for the product
//! service, camelCase for the generation service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Product lookup
// ---------------------------------------------------------------------------

/// Top-level envelope of `/api/v2/product/{barcode}`.
///
/// The service signals an unknown barcode two ways: a 404, or a 200 whose
/// envelope simply lacks a `product`. Callers should treat both the same.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupEnvelope {
    pub code: Option<String>,
    pub status: u8,
    pub status_verbose: Option<String>,
    pub product: Option<Product>,
}

/// A product record, reduced to the fields the scan flow consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub product_name: Option<String>,
    pub product_name_en: Option<String>,
    pub brands: Option<String>,
    pub categories: Option<String>,
    pub ingredients_text: Option<String>,
    pub ingredients_text_en: Option<String>,
    pub image_front_url: Option<String>,
    pub image_url: Option<String>,
    pub nutriments: Nutriments,
    pub nutriscore_grade: Option<String>,
    pub nova_group: Option<u8>,
    pub allergens_tags: Vec<String>,
    pub additives_tags: Vec<String>,
}

impl Product {
    /// Localized name, falling back to the English name, then a placeholder.
    pub fn display_name(&self) -> &str {
        non_empty(&self.product_name)
            .or_else(|| non_empty(&self.product_name_en))
            .unwrap_or("Unknown Product")
    }

    /// Ingredient list text, preferring the localized field.
    pub fn ingredients(&self) -> Option<&str> {
        non_empty(&self.ingredients_text).or_else(|| non_empty(&self.ingredients_text_en))
    }

    /// Front-of-pack image, falling back to the generic image.
    pub fn image(&self) -> Option<&str> {
        non_empty(&self.image_front_url).or_else(|| non_empty(&self.image_url))
    }

    /// Nutri-Score letter as the service computed it, uppercased.
    pub fn nutri_grade(&self) -> Option<String> {
        non_empty(&self.nutriscore_grade).map(str::to_uppercase)
    }

    /// Allergen tags with the language prefix removed (`en:milk` → `milk`).
    pub fn allergens(&self) -> Vec<&str> {
        strip_tag_prefixes(&self.allergens_tags)
    }

    /// Additive tags with the language prefix removed (`en:e330` → `e330`).
    pub fn additives(&self) -> Vec<&str> {
        strip_tag_prefixes(&self.additives_tags)
    }
}

fn strip_tag_prefixes(tags: &[String]) -> Vec<&str> {
    tags.iter()
        .map(|tag| tag.strip_prefix("en:").unwrap_or(tag))
        .collect()
}

/// Raw nutriment numbers. The service reports both per-100g and
/// per-serving values; per-100g wins when both are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nutriments {
    #[serde(rename = "energy-kcal_100g")]
    pub energy_kcal_100g: Option<f64>,
    #[serde(rename = "energy-kcal")]
    pub energy_kcal: Option<f64>,
    pub proteins_100g: Option<f64>,
    pub proteins: Option<f64>,
    pub carbohydrates_100g: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub fat_100g: Option<f64>,
    pub fat: Option<f64>,
    pub sugars_100g: Option<f64>,
    pub sugars: Option<f64>,
    pub fiber_100g: Option<f64>,
    pub fiber: Option<f64>,
    pub salt_100g: Option<f64>,
    pub salt: Option<f64>,
    #[serde(rename = "saturated-fat_100g")]
    pub saturated_fat_100g: Option<f64>,
}

impl Nutriments {
    /// Collapse the raw numbers into display-ready macros: calories to
    /// whole kcal, salt to 0.01, everything else to 0.1. Missing values
    /// read as zero.
    pub fn macros(&self) -> Macros {
        fn pick(per_100g: Option<f64>, fallback: Option<f64>) -> f64 {
            per_100g.or(fallback).unwrap_or(0.0)
        }
        Macros {
            calories: pick(self.energy_kcal_100g, self.energy_kcal).round() as i64,
            protein: round1(pick(self.proteins_100g, self.proteins)),
            carbs: round1(pick(self.carbohydrates_100g, self.carbohydrates)),
            fats: round1(pick(self.fat_100g, self.fat)),
            sugar: round1(pick(self.sugars_100g, self.sugars)),
            fiber: round1(pick(self.fiber_100g, self.fiber)),
            salt: round2(pick(self.salt_100g, self.salt)),
            saturated_fat: round1(self.saturated_fat_100g.unwrap_or(0.0)),
        }
    }
}

/// Per-100g macros rounded for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macros {
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub sugar: f64,
    pub fiber: f64,
    pub salt: f64,
    pub saturated_fat: f64,
}

// ---------------------------------------------------------------------------
// Content generation
// ---------------------------------------------------------------------------

/// Request payload for `models/{model}:generateContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(
        rename = "generationConfig",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateRequest {
    /// A single-turn, text-only prompt.
    pub fn from_text(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Part::text(prompt)],
            }],
            generation_config: None,
        }
    }

    /// A prompt plus one inline image, as the scan-analysis flow sends.
    pub fn with_image(
        prompt: impl Into<String>,
        mime_type: impl Into<String>,
        base64_data: impl Into<String>,
    ) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Part::text(prompt), Part::image(mime_type, base64_data)],
            }],
            generation_config: None,
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

/// One turn of content: an ordered list of parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single content part: text or inline binary data, never both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        rename = "inline_data",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn image(mime_type: impl Into<String>, base64_data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: base64_data.into(),
            }),
        }
    }
}

/// Base64 payload with its media type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineData {
    #[serde(rename = "mime_type")]
    pub mime_type: String,
    pub data: String,
}

/// Sampling knobs the scan flows set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(
        rename = "maxOutputTokens",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_output_tokens: Option<u32>,
}

/// Response envelope of `models/{model}:generateContent`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateResponse {
    pub candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// The first non-empty text part across candidates, in order.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .find_map(|part| part.text.as_deref().filter(|text| !text.is_empty()))
    }
}

/// One generated candidate. Safety metadata is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Candidate {
    pub content: Option<Content>,
}

/// Best-effort extraction of a JSON value from a model reply.
///
/// Models asked to "respond only with JSON" routinely wrap the payload in
/// markdown code fences or lead-in prose. Fences are stripped first; if
/// the remainder still fails to parse, the outermost `{...}` slice gets
/// one more try.
pub fn extract_json(text: &str) -> Option<Value> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();
    if let Ok(value) = serde_json::from_str(cleaned) {
        return Some(value);
    }
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&cleaned[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_name_prefers_localized_then_english() {
        let mut product = Product {
            product_name: Some("Kit de nouilles".to_string()),
            product_name_en: Some("Noodle kit".to_string()),
            ..Product::default()
        };
        assert_eq!(product.display_name(), "Kit de nouilles");

        product.product_name = Some(String::new());
        assert_eq!(product.display_name(), "Noodle kit");

        product.product_name_en = None;
        assert_eq!(product.display_name(), "Unknown Product");
    }

    #[test]
    fn tag_prefixes_are_stripped() {
        let product = Product {
            allergens_tags: vec!["en:peanuts".to_string(), "fr:arachides".to_string()],
            additives_tags: vec!["en:e330".to_string()],
            ..Product::default()
        };
        assert_eq!(product.allergens(), vec!["peanuts", "fr:arachides"]);
        assert_eq!(product.additives(), vec!["e330"]);
    }

    #[test]
    fn nutri_grade_is_uppercased() {
        let product = Product {
            nutriscore_grade: Some("c".to_string()),
            ..Product::default()
        };
        assert_eq!(product.nutri_grade().as_deref(), Some("C"));
        assert!(Product::default().nutri_grade().is_none());
    }

    #[test]
    fn macros_prefer_per_100g_and_round() {
        let nutriments: Nutriments = serde_json::from_value(json!({
            "energy-kcal_100g": 385.4,
            "energy-kcal": 999.0,
            "proteins_100g": 9.26,
            "carbohydrates": 71.15,
            "fat_100g": 7.0,
            "sugars_100g": 13.89,
            "salt_100g": 1.2345,
            "saturated-fat_100g": 1.06
        }))
        .unwrap();
        let macros = nutriments.macros();
        assert_eq!(macros.calories, 385);
        assert_eq!(macros.protein, 9.3);
        assert_eq!(macros.carbs, 71.2);
        assert_eq!(macros.fats, 7.0);
        assert_eq!(macros.sugar, 13.9);
        assert_eq!(macros.fiber, 0.0);
        assert_eq!(macros.salt, 1.23);
        assert_eq!(macros.saturated_fat, 1.1);
    }

    #[test]
    fn lookup_envelope_tolerates_missing_product() {
        let envelope: LookupEnvelope =
            serde_json::from_str(r#"{"status":0,"status_verbose":"product not found"}"#).unwrap();
        assert_eq!(envelope.status, 0);
        assert!(envelope.product.is_none());
    }

    #[test]
    fn generate_request_serializes_to_wire_names() {
        let request = GenerateRequest::from_text("Say hello").with_config(GenerationConfig {
            temperature: Some(0.1),
            max_output_tokens: Some(200),
        });
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{"parts": [{"text": "Say hello"}]}],
                "generationConfig": {"temperature": 0.1, "maxOutputTokens": 200}
            })
        );
    }

    #[test]
    fn generate_request_without_config_omits_it() {
        let value = serde_json::to_value(GenerateRequest::from_text("hi")).unwrap();
        assert!(value.get("generationConfig").is_none());
    }

    #[test]
    fn generate_request_with_image_carries_inline_data() {
        let request = GenerateRequest::with_image("What is this?", "image/jpeg", "aGVsbG8=");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["contents"][0]["parts"][1]["inline_data"],
            json!({"mime_type": "image/jpeg", "data": "aGVsbG8="})
        );
    }

    #[test]
    fn first_text_skips_empty_and_imageless_candidates() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": ""}]}},
                {"content": {"role": "model", "parts": [{"text": "classified"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(response.first_text(), Some("classified"));
    }

    #[test]
    fn first_text_none_when_no_candidates() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.first_text().is_none());
    }

    #[test]
    fn extract_json_handles_fenced_replies() {
        let reply = "```json\n{\"summary\": \"ok\"}\n```";
        assert_eq!(extract_json(reply), Some(json!({"summary": "ok"})));
    }

    #[test]
    fn extract_json_handles_bare_json() {
        assert_eq!(extract_json(r#"{"a":1}"#), Some(json!({"a": 1})));
    }

    #[test]
    fn extract_json_falls_back_to_outer_braces() {
        let reply = "Here is the result: {\"grade\": \"B\"} — hope that helps.";
        assert_eq!(extract_json(reply), Some(json!({"grade": "B"})));
    }

    #[test]
    fn extract_json_rejects_plain_prose() {
        assert!(extract_json("no json here").is_none());
    }
}
