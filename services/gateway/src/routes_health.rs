use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::SharedState;

pub async fn get_health(State(state): State<SharedState>) -> Json<Value> {
    let ml = match &state.provider {
        None => "disabled",
        Some(p) => {
            if p.health().await {
                "up"
            } else {
                "down"
            }
        }
    };

    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
        "mlService": ml,
    }))
}

pub async fn get_index(State(state): State<SharedState>) -> Json<Value> {
    let provider = state.provider.as_ref().map(|p| p.info());
    Json(json!({
        "name": "Forecast & XAI Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "routes": ["/data", "/models", "/forecast", "/explain", "/scenario"],
        "health": "/health",
        "provider": provider,
    }))
}

pub async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
