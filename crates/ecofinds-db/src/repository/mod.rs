//! # Repository Module
//!
//! Database repository implementations for EcoFinds.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                           │
//! │       │                                                                 │
//! │       │  db.cart().add(&actor_id, &new_item)                            │
//! │       ▼                                                                 │
//! │  CartRepository                                                         │
//! │  ├── list(&self, actor_id)                                              │
//! │  ├── add(&self, actor_id, item)                                         │
//! │  └── remove(&self, actor_id, cart_item_id)                              │
//! │       │                                                                 │
//! │       │  SQL (+ ecofinds_core::rules for the decisions)                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Lock Discipline
//! A deferred SQLite transaction that reads before it writes cannot upgrade
//! to a write lock once another connection has committed; it fails with
//! `SQLITE_BUSY` instead of waiting. Multi-statement writes here therefore
//! always start with a write statement, and single-statement writes carry
//! their preconditions in the `WHERE` clause.
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - Accounts and credentials
//! - [`profile::ProfileRepository`] - Lazily created profile rows
//! - [`category::CategoryRepository`] - Seeded categories
//! - [`product::ProductRepository`] - Listings: create, read, search, edit, delete
//! - [`cart::CartRepository`] - Per-user cart
//! - [`order::OrderRepository`] - Order placement and history

pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod profile;
pub mod user;
