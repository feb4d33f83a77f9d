//! # Domain Types
//!
//! Records and request payloads used throughout EcoFinds.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │    Product      │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  owner_id       │◄──│  product_id     │       │
//! │  │  email          │   │  price (Money)  │   │  buyer_id       │       │
//! │  │  name?          │   │  status         │   │  seller_id      │       │
//! │  └────────┬────────┘   └────────▲────────┘   │  total_amount   │       │
//! │           │                     │            └─────────────────┘       │
//! │  ┌────────▼────────┐   ┌────────┴────────┐   ┌─────────────────┐       │
//! │  │    Profile      │   │    CartItem     │   │    Category     │       │
//! │  │  (lazy, 1:1)    │   │  (user,product) │   │  id (integer)   │       │
//! │  │  username/phone │   │  unique pair    │   │  name (unique)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Response records serialize with snake_case keys; request payloads accept
//! the camelCase keys the front ends send (`productId`, `categoryId`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::patch::Patch;

// =============================================================================
// User
// =============================================================================

/// A registered account. The password hash never leaves ecofinds-db.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product Status
// =============================================================================

/// Listing lifecycle. Only `Available → Sold` is ever allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Available,
    Sold,
}

impl Default for ProductStatus {
    fn default() -> Self {
        ProductStatus::Available
    }
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "available",
            ProductStatus::Sold => "sold",
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A single-quantity listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Seller who created the listing.
    pub owner_id: String,

    pub title: String,
    pub description: Option<String>,

    /// Asking price, always positive.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    #[ts(as = "String")]
    pub price: Money,

    pub category_id: Option<i64>,

    /// Image reference (URL only, no storage).
    pub image_url: Option<String>,

    pub status: ProductStatus,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn is_available(&self) -> bool {
        self.status == ProductStatus::Available
    }
}

/// A product joined with its category name and seller email, as shown on
/// browse and detail pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductListing {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub product: Product,
    pub category_name: Option<String>,
    pub seller_email: String,
}

/// Browse filters. Every field is optional; empty strings are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearch {
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    /// Category id, or `"all"` for no filter.
    pub category: Option<String>,
    /// Seller id.
    pub user_id: Option<String>,
}

/// Payload for creating a listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: String,
    pub price: Money,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Partial edit of a listing. Each field follows [`Patch`] semantics.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductUpdate {
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub price: Patch<Money>,
    pub category_id: Patch<i64>,
    pub image_url: Patch<String>,
    pub status: Patch<ProductStatus>,
}

impl ProductUpdate {
    /// True when no field was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_absent()
            && self.description.is_absent()
            && self.price.is_absent()
            && self.category_id.is_absent()
            && self.image_url.is_absent()
            && self.status.is_absent()
    }
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

// =============================================================================
// Cart
// =============================================================================

/// A row of a user's cart. At most one per (user, product).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartItem {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub quantity: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A cart row joined with the product it points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartEntry {
    pub id: String,
    pub quantity: i64,
    pub product_id: String,
    pub title: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    #[ts(as = "String")]
    pub price: Money,
    pub image_url: Option<String>,
    pub status: ProductStatus,
    pub seller_email: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Payload for adding a product to the cart.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub product_id: String,
    /// Defaults to 1.
    #[serde(default)]
    pub quantity: Option<i64>,
}

// =============================================================================
// Order
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    /// Orders are created completed; there is no payment step.
    Completed,
    Cancelled,
}

/// A purchase. Immutable once created apart from `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub product_id: String,
    /// Product price captured when the order was placed.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "total_cents"))]
    #[ts(as = "String")]
    pub total_amount: Money,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// An order joined with product and seller details for "my orders".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderSummary {
    pub id: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "total_cents"))]
    #[ts(as = "String")]
    pub total_amount: Money,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub product_id: String,
    pub title: String,
    pub image_url: Option<String>,
    pub seller_email: String,
}

/// Payload for placing an order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub product_id: String,
}

// =============================================================================
// Profile
// =============================================================================

/// A user joined with their (possibly not yet created) profile row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Profile {
    /// The user id.
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial edit of the actor's profile. `name` lives on the user row.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub name: Patch<String>,
    pub username: Patch<String>,
    pub phone: Patch<String>,
    pub address: Patch<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_absent()
            && self.username.is_absent()
            && self.phone.is_absent()
            && self.address.is_absent()
    }

    /// True when any field stored on the profile row was supplied.
    pub fn touches_profile_row(&self) -> bool {
        !(self.username.is_absent() && self.phone.is_absent() && self.address.is_absent())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_status_default() {
        assert_eq!(ProductStatus::default(), ProductStatus::Available);
        assert_eq!(ProductStatus::Sold.as_str(), "sold");
    }

    #[test]
    fn test_new_product_accepts_camel_case() {
        let p: NewProduct = serde_json::from_str(
            r#"{"title":"Lamp","price":"12.50","categoryId":3,"imageUrl":"https://x/y.png"}"#,
        )
        .unwrap();
        assert_eq!(p.price.cents(), 1250);
        assert_eq!(p.category_id, Some(3));
        assert_eq!(p.description, None);
    }

    #[test]
    fn test_product_update_absent_vs_null() {
        let u: ProductUpdate =
            serde_json::from_str(r#"{"description":null,"status":"sold"}"#).unwrap();
        assert!(u.title.is_absent());
        assert_eq!(u.description, Patch::Null);
        assert_eq!(u.status, Patch::Value(ProductStatus::Sold));
        assert!(!u.is_empty());

        let u: ProductUpdate = serde_json::from_str("{}").unwrap();
        assert!(u.is_empty());
    }

    #[test]
    fn test_order_serializes_total_as_decimal_string() {
        let order = Order {
            id: "o1".into(),
            buyer_id: "u2".into(),
            seller_id: "u1".into(),
            product_id: "p".into(),
            total_amount: Money::from_cents(2000),
            status: OrderStatus::Completed,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["total_amount"], "20.00");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["buyer_id"], "u2");
    }

    #[test]
    fn test_listing_flattens_product() {
        let now = Utc::now();
        let listing = ProductListing {
            product: Product {
                id: "p".into(),
                owner_id: "u1".into(),
                title: "Chair".into(),
                description: None,
                price: Money::from_cents(500),
                category_id: None,
                image_url: None,
                status: ProductStatus::Available,
                created_at: now,
                updated_at: now,
            },
            category_name: None,
            seller_email: "s@example.com".into(),
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["title"], "Chair");
        assert_eq!(json["price"], "5.00");
        assert_eq!(json["seller_email"], "s@example.com");
    }

    #[test]
    fn test_profile_update_row_detection() {
        let u: ProfileUpdate = serde_json::from_str(r#"{"name":"Ann"}"#).unwrap();
        assert!(!u.is_empty());
        assert!(!u.touches_profile_row());

        let u: ProfileUpdate = serde_json::from_str(r#"{"phone":null}"#).unwrap();
        assert!(u.touches_profile_row());
    }
}
