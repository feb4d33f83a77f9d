//! # Cart Repository
//!
//! Per-user shopping cart. A product appears at most once per cart, and
//! only available products that belong to someone else can be added.
//!
//! ## Add Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  INSERT INTO cart_items ... SELECT ... FROM products                    │
//! │      WHERE id = ? AND status = 'available' AND owner_id <> actor        │
//! │       │                                                                 │
//! │       ├── 1 row  → added                                                │
//! │       ├── UNIQUE(user_id, product_id) → Conflict (already in cart)      │
//! │       └── 0 rows → re-read the product to explain why                   │
//! │                    (NotFound / InvalidOperation)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use ecofinds_core::rules::{check_cart_add, ensure_owner};
use ecofinds_core::validation::{validate_id, validate_quantity};
use ecofinds_core::{CartEntry, CartItem, CoreError, NewCartItem, ProductStatus};

#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Lists the actor's cart, newest first, joined with product details.
    ///
    /// Rows for products that were sold to someone else are already gone:
    /// order placement purges them.
    pub async fn list(&self, user_id: &str) -> DbResult<Vec<CartEntry>> {
        let entries = sqlx::query_as::<_, CartEntry>(
            r#"
            SELECT
                ci.id, ci.quantity, ci.created_at,
                p.id AS product_id, p.title, p.price_cents, p.image_url, p.status,
                u.email AS seller_email
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            JOIN users u ON u.id = p.owner_id
            WHERE ci.user_id = ?1
            ORDER BY ci.created_at DESC, ci.rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Adds a product to the actor's cart.
    pub async fn add(&self, user_id: &str, item: NewCartItem) -> DbResult<CartItem> {
        validate_id("productId", &item.product_id)?;
        let quantity = item.quantity.unwrap_or(1);
        validate_quantity(quantity)?;

        let result = sqlx::query_as::<_, CartItem>(
            r#"
            INSERT INTO cart_items (id, user_id, product_id, quantity, created_at)
            SELECT ?1, ?2, p.id, ?4, ?5
            FROM products p
            WHERE p.id = ?3 AND p.status = 'available' AND p.owner_id <> ?2
            RETURNING id, user_id, product_id, quantity, created_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(&item.product_id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await;

        let inserted = match result {
            Ok(row) => row,
            Err(err) => {
                return match DbError::from(err) {
                    e if e.is_unique_violation_on("cart_items.product_id") => {
                        Err(CoreError::conflict("Product already in cart").into())
                    }
                    DbError::ForeignKeyViolation { .. } => {
                        Err(CoreError::not_found("User", user_id).into())
                    }
                    e => Err(e),
                }
            }
        };

        match inserted {
            Some(cart_item) => {
                info!(
                    user_id = %user_id,
                    product_id = %cart_item.product_id,
                    "Added to cart"
                );
                Ok(cart_item)
            }
            None => {
                let product: Option<(String, ProductStatus)> =
                    sqlx::query_as("SELECT owner_id, status FROM products WHERE id = ?1")
                        .bind(&item.product_id)
                        .fetch_optional(&self.pool)
                        .await?;

                debug!(product_id = %item.product_id, "Cart add matched no available product");

                check_cart_add(
                    &item.product_id,
                    product.as_ref().map(|(owner, status)| (owner.as_str(), *status)),
                    user_id,
                )?;

                // The product was sold between the insert and the re-read.
                Err(CoreError::conflict("Product is not available").into())
            }
        }
    }

    /// Removes one of the actor's cart rows.
    pub async fn remove(&self, user_id: &str, cart_item_id: &str) -> DbResult<()> {
        let owner: Option<String> =
            sqlx::query_scalar("SELECT user_id FROM cart_items WHERE id = ?1")
                .bind(cart_item_id)
                .fetch_optional(&self.pool)
                .await?;

        let owner = owner.ok_or_else(|| CoreError::not_found("Cart item", cart_item_id))?;
        ensure_owner(&owner, user_id, "cart item")?;

        let result = sqlx::query("DELETE FROM cart_items WHERE id = ?1 AND user_id = ?2")
            .bind(cart_item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Cart item", cart_item_id).into());
        }

        info!(user_id = %user_id, cart_item_id = %cart_item_id, "Removed from cart");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{listing, memory_db, user};
    use ecofinds_core::ValidationError;

    fn add(product_id: &str) -> NewCartItem {
        NewCartItem {
            product_id: product_id.to_string(),
            quantity: None,
        }
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let db = memory_db().await;
        let seller = user(&db, "seller@example.com").await;
        let buyer = user(&db, "buyer@example.com").await;
        let lamp = listing(&db, &seller, "Lamp", 1200).await;
        let desk = listing(&db, &seller, "Desk", 5000).await;

        let first = db.cart().add(&buyer.id, add(&lamp.id)).await.unwrap();
        assert_eq!(first.quantity, 1);
        db.cart()
            .add(
                &buyer.id,
                NewCartItem {
                    product_id: desk.id.clone(),
                    quantity: Some(2),
                },
            )
            .await
            .unwrap();

        let entries = db.cart().list(&buyer.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].product_id, desk.id);
        assert_eq!(entries[0].quantity, 2);
        assert_eq!(entries[1].title, "Lamp");
        assert_eq!(entries[1].price.cents(), 1200);
        assert_eq!(entries[1].seller_email, "seller@example.com");

        assert!(db.cart().list(&seller.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_twice_is_conflict() {
        let db = memory_db().await;
        let seller = user(&db, "seller@example.com").await;
        let buyer = user(&db, "buyer@example.com").await;
        let lamp = listing(&db, &seller, "Lamp", 1200).await;

        db.cart().add(&buyer.id, add(&lamp.id)).await.unwrap();
        let err = db.cart().add(&buyer.id, add(&lamp.id)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Conflict(_))));
        assert_eq!(db.cart().list(&buyer.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_own_product_is_invalid() {
        let db = memory_db().await;
        let seller = user(&db, "seller@example.com").await;
        let lamp = listing(&db, &seller, "Lamp", 1200).await;

        let err = db.cart().add(&seller.id, add(&lamp.id)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn test_add_missing_or_sold_is_not_found() {
        let db = memory_db().await;
        let seller = user(&db, "seller@example.com").await;
        let buyer = user(&db, "buyer@example.com").await;
        let lamp = listing(&db, &seller, "Lamp", 1200).await;
        sqlx::query("UPDATE products SET status = 'sold' WHERE id = ?1")
            .bind(&lamp.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.cart().add(&buyer.id, add(&lamp.id)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));

        let err = db.cart().add(&buyer.id, add("missing")).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_add_rejects_bad_quantity() {
        let db = memory_db().await;
        let seller = user(&db, "seller@example.com").await;
        let buyer = user(&db, "buyer@example.com").await;
        let lamp = listing(&db, &seller, "Lamp", 1200).await;

        let err = db
            .cart()
            .add(
                &buyer.id,
                NewCartItem {
                    product_id: lamp.id.clone(),
                    quantity: Some(0),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
    }

    #[tokio::test]
    async fn test_remove_rules() {
        let db = memory_db().await;
        let seller = user(&db, "seller@example.com").await;
        let buyer = user(&db, "buyer@example.com").await;
        let other = user(&db, "other@example.com").await;
        let lamp = listing(&db, &seller, "Lamp", 1200).await;
        let item = db.cart().add(&buyer.id, add(&lamp.id)).await.unwrap();

        let err = db.cart().remove(&other.id, &item.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Forbidden(_))));

        db.cart().remove(&buyer.id, &item.id).await.unwrap();
        assert!(db.cart().list(&buyer.id).await.unwrap().is_empty());

        let err = db.cart().remove(&buyer.id, &item.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_deleting_product_removes_cart_rows() {
        let db = memory_db().await;
        let seller = user(&db, "seller@example.com").await;
        let buyer = user(&db, "buyer@example.com").await;
        let lamp = listing(&db, &seller, "Lamp", 1200).await;
        db.cart().add(&buyer.id, add(&lamp.id)).await.unwrap();

        db.products().delete(&seller.id, &lamp.id).await.unwrap();
        assert!(db.cart().list(&buyer.id).await.unwrap().is_empty());
    }
}
