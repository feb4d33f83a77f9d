//! Listing routes. Browse and detail are public; everything else acts on
//! behalf of the authenticated seller.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use ecofinds_core::{NewProduct, ProductSearch, ProductUpdate};

use super::AppJson;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

/// `GET /api/products?search=&category=&userId=`
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ProductSearch>,
) -> ApiResult<Json<Value>> {
    let products = state.db.products().search(&filter).await?;
    Ok(Json(json!({ "products": products })))
}

pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let product = state.db.products().get_listing(&id).await?;
    Ok(Json(json!({ "product": product })))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppJson(new): AppJson<NewProduct>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let product = state.db.products().create(&user.id, new).await?;
    Ok((StatusCode::CREATED, Json(json!({ "product": product }))))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    AppJson(update): AppJson<ProductUpdate>,
) -> ApiResult<Json<Value>> {
    let product = state.db.products().update(&user.id, &id, update).await?;
    Ok(Json(json!({ "product": product })))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.db.products().delete(&user.id, &id).await?;
    Ok(Json(json!({ "message": "Product deleted" })))
}
