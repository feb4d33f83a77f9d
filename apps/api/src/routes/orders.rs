//! Order routes. `POST /api/orders` is the purchase itself; see
//! `OrderRepository::place_order` for the transaction.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use ecofinds_core::PlaceOrder;

use super::AppJson;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

pub async fn list(State(state): State<Arc<AppState>>, user: AuthUser) -> ApiResult<Json<Value>> {
    let orders = state.db.orders().list_for_buyer(&user.id).await?;
    Ok(Json(json!({ "orders": orders })))
}

pub async fn place(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppJson(req): AppJson<PlaceOrder>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let order = state
        .db
        .orders()
        .place_order(&user.id, &req.product_id)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "order": order }))))
}
