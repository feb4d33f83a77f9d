use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::AppState;

pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let categories = state.db.categories().list().await?;
    Ok(Json(json!({ "categories": categories })))
}
