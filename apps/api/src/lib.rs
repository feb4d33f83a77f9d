//! # EcoFinds API
//!
//! HTTP server for the second-hand marketplace.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            API Routes                                   │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  auth          │  │  products      │  │  cart / orders             ││
//! │  │                │  │                │  │                            ││
//! │  │ • register     │  │ • browse/search│  │ • list/add/remove cart     ││
//! │  │ • login        │  │ • create/read  │  │ • place order ★            ││
//! │  │                │  │ • edit/delete  │  │ • order history            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  profile       │  │  categories    │  │  health                    ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │  SQLite      │  │  JWT Auth    │  │  Request logging         ││  │
//! │  │  │ (ecofinds-db)│  │  AuthUser    │  │  (tracing span/request)  ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config`]. Environment variables use the `ECOFINDS__` prefix, e.g.
//! `ECOFINDS__SERVER__PORT`, `ECOFINDS__DATABASE__PATH`,
//! `ECOFINDS__AUTH__JWT_SECRET`.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use tracing::{info, info_span, Instrument};

use ecofinds_db::Database;

// Re-exports
pub use auth::{AuthUser, JwtManager};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(config: ApiConfig, db: Database) -> Self {
        let jwt = JwtManager::new(&config.auth.jwt_secret, config.auth.token_lifetime_secs);
        AppState { db, jwt, config }
    }
}

/// Builds the full router with request logging.
pub fn app(state: Arc<AppState>) -> Router {
    routes::router(state).layer(middleware::from_fn(log_requests))
}

/// Opens one span per request and logs status and latency when it completes.
async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let span = info_span!("request", %method, %path);
    let started = Instant::now();

    let response = next.run(req).instrument(span.clone()).await;

    info!(
        parent: &span,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}
