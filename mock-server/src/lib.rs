//! In-process stand-in for the two upstream APIs the core talks to:
//! barcode lookup (`/api/v2/product/{barcode}`) and content generation
//! (`/v1beta/models/{model}:generateContent`). One barcode is baked in as
//! a fixture; the generation route echoes the prompt back inside a fenced
//! JSON block, the shape real model replies arrive in. A `/plain` route
//! serves a deliberately non-JSON body.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// The one barcode the lookup route knows.
pub const FIXTURE_BARCODE: &str = "737628064502";

#[derive(Deserialize)]
pub struct GenerateBody {
    #[serde(default)]
    pub contents: Vec<GenerateContent>,
}

#[derive(Deserialize)]
pub struct GenerateContent {
    #[serde(default)]
    pub parts: Vec<GeneratePart>,
}

#[derive(Deserialize)]
pub struct GeneratePart {
    #[serde(default)]
    pub text: Option<String>,
}

pub fn app() -> Router {
    Router::new()
        .route("/api/v2/product/{barcode}", get(lookup_product))
        .route("/v1beta/models/{model_action}", post(generate_content))
        .route("/plain", get(plain))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn lookup_product(Path(barcode): Path<String>) -> (StatusCode, Json<Value>) {
    if barcode != FIXTURE_BARCODE {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "code": barcode,
                "status": 0,
                "status_verbose": "product not found"
            })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "code": FIXTURE_BARCODE,
            "status": 1,
            "status_verbose": "product found",
            "product": {
                "product_name": "Thai peanut noodle kit",
                "brands": "Simply Asia",
                "categories": "Noodle dishes",
                "ingredients_text": "Rice noodles, peanut sauce, sugar, salt",
                "image_front_url": "https://images.example.org/737628064502/front.jpg",
                "nutriments": {
                    "energy-kcal_100g": 385.0,
                    "proteins_100g": 9.26,
                    "carbohydrates_100g": 71.15,
                    "fat_100g": 7.0,
                    "sugars_100g": 13.89,
                    "fiber_100g": 1.9,
                    "salt_100g": 0.72
                },
                "nutriscore_grade": "c",
                "nova_group": 4,
                "allergens_tags": ["en:peanuts"],
                "additives_tags": ["en:e330"]
            }
        })),
    )
}

/// The path segment is `{model}:generateContent`; anything else under
/// `/v1beta/models/` is a 404, matching the real service. A missing or
/// empty `key` query parameter gets the service's 400 error envelope.
async fn generate_content(
    Path(model_action): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<GenerateBody>,
) -> (StatusCode, Json<Value>) {
    let Some(model) = model_action.strip_suffix(":generateContent") else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": {"code": 404, "message": format!("unknown method for {model_action}")}
            })),
        );
    };
    if params.get("key").map_or(true, |key| key.is_empty()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {"code": 400, "message": "API key not valid. Please pass a valid API key."}
            })),
        );
    }

    let prompt = body
        .contents
        .iter()
        .flat_map(|content| content.parts.iter())
        .find_map(|part| part.text.clone())
        .unwrap_or_default();
    let payload = json!({"model": model, "echo": prompt});
    let reply = format!("```json\n{payload}\n```");

    (
        StatusCode::OK,
        Json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": reply}]},
                "finishReason": "STOP"
            }]
        })),
    )
}

async fn plain() -> &'static str {
    "this body is not json"
}
