// src/handlers/health.rs

use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::config::AppState;

// GET /health
pub async fn health(State(app_state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "backend": app_state.repo.backend(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
