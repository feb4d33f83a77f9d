use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use ecofinds_core::ProfileUpdate;

use super::AppJson;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Value>> {
    let profile = state.db.profiles().get(&user.id).await?;
    Ok(Json(json!({ "profile": profile })))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppJson(update): AppJson<ProfileUpdate>,
) -> ApiResult<Json<Value>> {
    let profile = state.db.profiles().update(&user.id, update).await?;
    Ok(Json(json!({ "profile": profile })))
}
