use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::AppState;

/// Health check endpoint. 503 when the database does not answer.
pub async fn check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    if state.db.health_check().await {
        (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "connected" })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "database": "unavailable" })),
        )
    }
}
