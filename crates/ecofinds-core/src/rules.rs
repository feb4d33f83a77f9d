//! # Marketplace Rules
//!
//! Pure decisions the repositories make inside their transactions.
//!
//! ## Purchase Preconditions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  classify_purchase(product, buyer)                                      │
//! │                                                                         │
//! │  product row missing?          ──► NotFound                             │
//! │        │ no                                                             │
//! │        ▼                                                                │
//! │  status != available?          ──► NotAvailable  (Conflict)            │
//! │        │ no                                                             │
//! │        ▼                                                                │
//! │  owner == buyer?               ──► OwnProduct    (InvalidOperation)    │
//! │        │ no                                                             │
//! │        ▼                                                                │
//! │  Allowed                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The checks run in this order so that a sold listing reports Conflict even
//! when its owner is the one asking.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::patch::Patch;
use crate::types::{Product, ProductStatus, ProductUpdate, ProfileUpdate};
use crate::validation;

// =============================================================================
// Purchase
// =============================================================================

/// Outcome of the order-placement precondition checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseCheck {
    Allowed,
    NotFound,
    NotAvailable,
    OwnProduct,
}

/// Classifies a purchase attempt.
///
/// `product` is `(owner_id, status)` as read inside the order transaction,
/// or `None` when no row exists.
pub fn classify_purchase(product: Option<(&str, ProductStatus)>, buyer_id: &str) -> PurchaseCheck {
    match product {
        None => PurchaseCheck::NotFound,
        Some((_, status)) if status != ProductStatus::Available => PurchaseCheck::NotAvailable,
        Some((owner_id, _)) if owner_id == buyer_id => PurchaseCheck::OwnProduct,
        Some(_) => PurchaseCheck::Allowed,
    }
}

impl PurchaseCheck {
    /// Maps a failed check onto the error taxonomy.
    pub fn into_result(self, product_id: &str) -> CoreResult<()> {
        match self {
            PurchaseCheck::Allowed => Ok(()),
            PurchaseCheck::NotFound => Err(CoreError::not_found("Product", product_id)),
            PurchaseCheck::NotAvailable => Err(CoreError::conflict("Product is not available")),
            PurchaseCheck::OwnProduct => {
                Err(CoreError::invalid_operation("Cannot purchase your own product"))
            }
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Checks whether `actor_id` may put the product in their cart.
///
/// A missing or sold product is reported the same way, as NotFound.
pub fn check_cart_add(
    product_id: &str,
    product: Option<(&str, ProductStatus)>,
    actor_id: &str,
) -> CoreResult<()> {
    let owner_id = match product {
        Some((owner_id, ProductStatus::Available)) => owner_id,
        _ => {
            return Err(CoreError::not_found(
                "Product",
                format!("{product_id} (or not available)"),
            ))
        }
    };

    if owner_id == actor_id {
        return Err(CoreError::invalid_operation(
            "Cannot add your own product to cart",
        ));
    }

    Ok(())
}

// =============================================================================
// Ownership
// =============================================================================

/// Fails with Forbidden unless the actor is the owner.
pub fn ensure_owner(owner_id: &str, actor_id: &str, what: &str) -> CoreResult<()> {
    if owner_id == actor_id {
        Ok(())
    } else {
        Err(CoreError::forbidden(format!("You do not own this {what}")))
    }
}

/// Status edits may only move forward. `Sold → Available` is rejected.
pub fn check_status_transition(from: ProductStatus, to: ProductStatus) -> CoreResult<()> {
    match (from, to) {
        (ProductStatus::Sold, ProductStatus::Available) => Err(CoreError::invalid_operation(
            "Sold products cannot be made available again",
        )),
        _ => Ok(()),
    }
}

// =============================================================================
// Listing Edits
// =============================================================================

/// Applies a partial edit to a listing in memory.
///
/// Validates every supplied field, rejects `null` on required fields and
/// rejects an edit that carries no fields. Category existence is a store
/// concern and is checked by the caller.
pub fn apply_product_update(product: &mut Product, update: ProductUpdate) -> CoreResult<()> {
    if update.is_empty() {
        return Err(ValidationError::NoFieldsToUpdate.into());
    }

    // Work on a copy so a rejected field leaves the listing untouched.
    let mut next = product.clone();

    if let Some(title) = update.title.required("title")? {
        validation::validate_title(&title)?;
        next.title = title.trim().to_string();
    }

    if let Some(price) = update.price.required("price")? {
        validation::validate_price(price)?;
        next.price = price;
    }

    if let Some(status) = update.status.required("status")? {
        check_status_transition(next.status, status)?;
        next.status = status;
    }

    let description = update.description.map(|d| d.trim().to_string());
    if let Patch::Value(d) = description.as_ref() {
        validation::validate_description(d)?;
    }
    description.apply_to(&mut next.description);

    let image_url = update.image_url.map(|u| u.trim().to_string());
    if let Patch::Value(u) = image_url.as_ref() {
        validation::validate_image_url(u)?;
    }
    image_url.apply_to(&mut next.image_url);

    update.category_id.apply_to(&mut next.category_id);

    *product = next;
    Ok(())
}

/// Validates a profile edit before it touches the store.
pub fn validate_profile_update(update: &ProfileUpdate) -> CoreResult<()> {
    if update.is_empty() {
        return Err(ValidationError::NoFieldsToUpdate.into());
    }
    if let Patch::Value(name) = update.name.as_ref() {
        validation::validate_display_name(name)?;
    }
    if let Patch::Value(username) = update.username.as_ref() {
        validation::validate_username(username)?;
    }
    if let Patch::Value(phone) = update.phone.as_ref() {
        validation::validate_phone(phone)?;
    }
    if let Patch::Value(address) = update.address.as_ref() {
        validation::validate_address(address)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
