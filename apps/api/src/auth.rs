//! JWT authentication module.
//!
//! Handles password hashing, token generation and validation, and the
//! [`AuthUser`] extractor that turns a bearer token into a verified user id.
//!
//! ```text
//! Authorization: Bearer <jwt>
//!        │
//!        ▼
//! AuthUser::from_request_parts ── JwtManager::validate_access_token
//!        │                              │
//!        │                              └── bad/expired/wrong type → 401
//!        ▼
//! handler(user: AuthUser) ── db.orders().place_order(&user.id, ...)
//! ```

use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

const ACCESS_TOKEN: &str = "access";

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,

    /// Token type. Only access tokens are issued.
    pub token_type: String,
}

/// JWT token manager.
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        JwtManager {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user_id: &str, email: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: ACCESS_TOKEN.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode an access token.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, ApiError> {
        let token_data: TokenData<Claims> =
            decode(token, &self.decoding_key, &Validation::default()).map_err(|e| {
                debug!(error = %e, "Rejected token");
                ApiError::unauthorized("Invalid or expired token")
            })?;

        if token_data.claims.token_type != ACCESS_TOKEN {
            return Err(ApiError::unauthorized("Expected access token"));
        }

        Ok(token_data.claims)
    }
}

// =============================================================================
// Passwords
// =============================================================================

/// Hash a password for storage (Argon2id, random salt, PHC string).
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a password against its stored hash. A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Extractor
// =============================================================================

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Expected a bearer token"))?;

        let claims = state.jwt.validate_access_token(token)?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret-test-secret", 3600);

        let token = manager
            .generate_access_token("user-001", "ann@example.com")
            .unwrap();
        let claims = manager.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, "user-001");
        assert_eq!(claims.email, "ann@example.com");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtManager::new("secret-one-secret-one", 3600);
        let verifier = JwtManager::new("secret-two-secret-two", 3600);

        let token = issuer.generate_access_token("user-001", "a@b.co").unwrap();
        assert!(matches!(
            verifier.validate_access_token(&token),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Well past the default 60s leeway.
        let manager = JwtManager::new("test-secret-test-secret", -3600);
        let token = manager.generate_access_token("user-001", "a@b.co").unwrap();
        assert!(manager.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong password", &hash));
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }
}
