use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use ecofinds_core::NewCartItem;

use super::AppJson;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

pub async fn list(State(state): State<Arc<AppState>>, user: AuthUser) -> ApiResult<Json<Value>> {
    let items = state.db.cart().list(&user.id).await?;
    Ok(Json(json!({ "cartItems": items })))
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppJson(item): AppJson<NewCartItem>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let cart_item = state.db.cart().add(&user.id, item).await?;
    Ok((StatusCode::CREATED, Json(json!({ "cartItem": cart_item }))))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.db.cart().remove(&user.id, &id).await?;
    Ok(Json(json!({ "message": "Item removed from cart" })))
}
