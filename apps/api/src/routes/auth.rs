//! Registration and login.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ecofinds_core::validation::{validate_display_name, validate_email, validate_password};
use ecofinds_core::User;

use super::AppJson;
use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const BAD_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    if let Some(name) = &req.name {
        validate_display_name(name)?;
    }

    let password = req.password.clone();
    let password_hash = off_runtime(move || hash_password(&password)).await??;
    let user = state
        .db
        .users()
        .create(&req.email, &password_hash, req.name.as_deref())
        .await?;

    let token = state.jwt.generate_access_token(&user.id, &user.email)?;
    info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let creds = state.db.users().find_credentials(&req.email).await?;

    let verified = match creds {
        Some(c) => {
            let hash = c.password_hash.clone();
            off_runtime(move || verify_password(&req.password, &hash))
                .await?
                .then_some(c)
        }
        None => None,
    };

    let Some(creds) = verified else {
        warn!("Failed login attempt");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    };

    let token = state
        .jwt
        .generate_access_token(&creds.user.id, &creds.user.email)?;
    info!(user_id = %creds.user.id, "User logged in");

    Ok(Json(AuthResponse {
        token,
        user: creds.user,
    }))
}

/// Runs Argon2 work on the blocking pool so it does not stall request tasks.
async fn off_runtime<T, F>(work: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::internal(format!("password hashing task failed: {e}")))
}
