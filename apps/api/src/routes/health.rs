use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and which backends
/// are in use.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let store = if state.config.redis_url.is_some() { "redis" } else { "memory" };
    let generator = if state.config.anthropic_api_key.is_some() { "llm" } else { "offline" };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-editor-api",
        "store": store,
        "generator": generator
    }))
}
