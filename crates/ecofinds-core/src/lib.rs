//! # ecofinds-core: Pure Marketplace Rules for EcoFinds
//!
//! Domain types and rules for the EcoFinds second-hand marketplace, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        EcoFinds Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Web / Mobile front ends (out of tree)              │   │
//! │  │    Browse ──► Product ──► Cart ──► Checkout ──► My Orders       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    ecofinds-api (axum)                          │   │
//! │  │    authenticate ──► parse ──► repository call ──► map errors    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ecofinds-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   patch   │  │   rules   │  │   │
//! │  │   │  Product  │  │   Money   │  │  Patch<T> │  │ purchase  │  │   │
//! │  │   │   Order   │  │ "20.00"   │  │ abs/null  │  │ ownership │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  ecofinds-db (Database Layer)                   │   │
//! │  │        SQLite queries, migrations, order placement tx           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (User, Product, CartItem, Order, Profile, Category)
//! - [`money`] - Integer-cent money with a decimal-string wire format
//! - [`patch`] - Three-state field for partial updates
//! - [`rules`] - Purchase preconditions, ownership, listing edits
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use ecofinds_core::money::Money;
//! use ecofinds_core::rules::{classify_purchase, PurchaseCheck};
//! use ecofinds_core::ProductStatus;
//!
//! let price: Money = "20.00".parse().unwrap();
//! assert_eq!(price.cents(), 2000);
//!
//! let check = classify_purchase(Some(("seller-1", ProductStatus::Available)), "buyer-1");
//! assert_eq!(check, PurchaseCheck::Allowed);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod patch;
pub mod rules;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use patch::Patch;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single cart entry.
///
/// Listings are single-quantity, but the cart keeps the field the front ends
/// send; this bound stops runaway values (typing 1000 instead of 1).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum listing title length (characters).
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum listing description length (characters).
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// Category filter value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";
