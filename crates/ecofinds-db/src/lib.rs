//! # ecofinds-db: Database Layer for EcoFinds
//!
//! SQLite access for the marketplace through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        EcoFinds Data Flow                               │
//! │                                                                         │
//! │  HTTP handler (POST /api/orders)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   ecofinds-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ UserRepo      │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │    │ 001_initial_ │  │   │
//! │  │   │ WAL, FKs on   │    │ CartRepo      │    │  schema.sql  │  │   │
//! │  │   │               │    │ OrderRepo ★   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every repository method that acts on behalf of a user takes the verified
//! actor id as an explicit argument.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ecofinds_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("ecofinds.db")).await?;
//! let order = db.orders().place_order(&buyer_id, &product_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::cart::CartRepository;
pub use repository::category::CategoryRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::profile::ProfileRepository;
pub use repository::user::{UserCredentials, UserRepository};
