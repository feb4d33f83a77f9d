//! HTTP routes.
//!
//! Handlers are thin: extract the verified actor and the body, call one
//! repository operation, wrap the result. Request bodies go through
//! [`AppJson`] so malformed JSON comes back in the usual error shape.

pub mod auth;
pub mod cart;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;
pub mod profile;

use std::sync::Arc;

use axum::extract::FromRequest;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::error::ApiError;
use crate::AppState;

/// JSON body extractor whose rejection is an [`ApiError::Validation`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/categories", get(categories::list))
        .route("/products", get(products::search).post(products::create))
        .route(
            "/products/{id}",
            get(products::get_one)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/cart", get(cart::list).post(cart::add))
        .route("/cart/{id}", delete(cart::remove))
        .route("/orders", get(orders::list).post(orders::place))
        .route("/profile", get(profile::get_profile).put(profile::update));

    Router::new()
        .route("/health", get(health::check))
        .nest("/api", api)
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
