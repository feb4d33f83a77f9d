//! # Error Types
//!
//! Domain-specific error types for ecofinds-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ecofinds-core errors (this file)                                      │
//! │  ├── CoreError        - Marketplace rule failures                      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  ecofinds-db errors (separate crate)                                   │
//! │  └── DbError          - Store failures + Domain(CoreError)             │
//! │                                                                         │
//! │  ecofinds-api errors (in app)                                          │
//! │  └── ApiError         - What the client sees: {code, message}          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → HTTP         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Taxonomy
//! | Variant            | HTTP |
//! |--------------------|------|
//! | `NotFound`         | 404  |
//! | `Forbidden`        | 403  |
//! | `Conflict`         | 409  |
//! | `InvalidOperation` | 422  |
//! | `Unauthorized`     | 401  |
//! | `Validation`       | 400  |

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Marketplace rule failures.
///
/// None of these are retried; each is surfaced to the caller as-is.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The actor is authenticated but does not own the resource.
    #[error("{0}")]
    Forbidden(String),

    /// The resource is in a state that conflicts with the request.
    ///
    /// ## When This Occurs
    /// - Purchasing a product that is already sold
    /// - Adding a product that is already in the actor's cart
    /// - Registering an email or username that is taken
    #[error("{0}")]
    Conflict(String),

    /// The request is well-formed but the operation is not allowed.
    ///
    /// ## When This Occurs
    /// ```text
    /// Buyer == Seller ──► "cannot purchase own product"
    /// Seller adds own listing to cart ──► "cannot add own product to cart"
    /// Listing edited sold → available ──► "sold products cannot be relisted"
    /// ```
    #[error("{0}")]
    InvalidOperation(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        CoreError::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CoreError::Conflict(message.into())
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        CoreError::InvalidOperation(message.into())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when request data doesn't meet requirements and are checked
/// before any store access.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A required field was explicitly set to null.
    #[error("{field} cannot be null")]
    NotNullable { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid email, malformed amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Referenced value does not exist (e.g., unknown category id).
    #[error("{field} '{value}' does not exist")]
    UnknownReference { field: String, value: String },

    /// A partial update carried no fields.
    #[error("no fields to update")]
    NoFieldsToUpdate,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
