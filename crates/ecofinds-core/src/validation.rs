//! # Validation Module
//!
//! Input validation for EcoFinds requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum)                                        │
//! │  ├── JSON shape, types, Money format                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Lengths, ranges, formats                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE (email, username, cart pair)                               │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ecofinds_core::validation::{validate_email, validate_quantity};
//!
//! assert!(validate_email("ann@example.com").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_DESCRIPTION_LEN, MAX_ITEM_QUANTITY, MAX_TITLE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn too_long(field: &str, max: usize) -> ValidationError {
    ValidationError::TooLong {
        field: field.to_string(),
        max,
    }
}

// =============================================================================
// Listing Validators
// =============================================================================

/// Validates a listing title.
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(too_long("title", MAX_TITLE_LEN));
    }

    Ok(())
}

pub fn validate_description(description: &str) -> ValidationResult<()> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(too_long("description", MAX_DESCRIPTION_LEN));
    }
    Ok(())
}

/// Validates an asking price.
///
/// ## Rules
/// - Must be strictly positive (no free listings)
///
/// ## Example
/// ```rust
/// use ecofinds_core::money::Money;
/// use ecofinds_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_cents(2000)).is_ok());
/// assert!(validate_price(Money::zero()).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates an image reference. Only http(s) URLs are stored.
pub fn validate_image_url(url: &str) -> ValidationResult<()> {
    let url = url.trim();

    if url.len() > 2048 {
        return Err(too_long("imageUrl", 2048));
    }

    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(ValidationError::InvalidFormat {
            field: "imageUrl".to_string(),
            reason: "must be an http(s) URL".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (no filter)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(too_long("search", 100));
    }

    Ok(query.to_string())
}

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates that a referenced id was supplied.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Account Validators
// =============================================================================

/// Validates an email address.
///
/// This is a shape check (one `@`, non-empty local part, dotted domain), not
/// RFC 5322.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(too_long("email", 254));
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain.tld".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a password: 8 to 128 characters.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    let len = password.chars().count();

    if len < 8 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        });
    }

    if len > 128 {
        return Err(too_long("password", 128));
    }

    Ok(())
}

pub fn validate_display_name(name: &str) -> ValidationResult<()> {
    if name.chars().count() > 100 {
        return Err(too_long("name", 100));
    }
    Ok(())
}

/// Validates a public username.
///
/// ## Rules
/// - 3 to 30 characters
/// - Letters, digits, `_`, `.` and `-` only
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();
    let len = username.chars().count();

    if len < 3 {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        });
    }

    if len > 30 {
        return Err(too_long("username", 30));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, '_', '.' and '-'".to_string(),
        });
    }

    Ok(())
}

pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.chars().count() > 32 {
        return Err(too_long("phone", 32));
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces and + - ( )".to_string(),
        });
    }

    Ok(())
}

pub fn validate_address(address: &str) -> ValidationResult<()> {
    if address.chars().count() > 500 {
        return Err(too_long("address", 500));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
