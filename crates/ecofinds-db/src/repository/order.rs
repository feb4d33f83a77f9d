//! # Order Repository
//!
//! Order placement and purchase history.
//!
//! ## Order Placement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    place_order(buyer, product)                          │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   │                                                                     │
//! │   ├─ 1. UPDATE products SET status = 'sold'                             │
//! │   │       WHERE id = ? AND status = 'available' AND owner_id <> buyer   │
//! │   │       RETURNING owner_id, price_cents                               │
//! │   │     (claims the write lock and the listing in one statement)        │
//! │   │                                                                     │
//! │   │     no row? ── read (owner, status) ── classify ── ROLLBACK         │
//! │   │                  NotFound / Conflict / InvalidOperation             │
//! │   │                                                                     │
//! │   ├─ 2. INSERT INTO orders (... total = captured price, 'completed')    │
//! │   │                                                                     │
//! │   ├─ 3. DELETE FROM cart_items WHERE product_id = ?                     │
//! │   │     (every user's cart, not just the buyer's)                       │
//! │   │                                                                     │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two buyers racing for the same listing serialize on SQLite's write lock.
//! The loser's `UPDATE` runs after the winner commits, matches no row and
//! reports Conflict. Any error before `COMMIT` drops the transaction, so
//! nothing is ever half-applied.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use ecofinds_core::rules::classify_purchase;
use ecofinds_core::validation::validate_id;
use ecofinds_core::{CoreError, Money, Order, OrderStatus, OrderSummary, ProductStatus};

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Buys a listing for `buyer_id`.
    ///
    /// ## Errors
    /// - `NotFound` - no such product
    /// - `Conflict` - the product is already sold
    /// - `InvalidOperation` - the buyer owns the product
    /// - `NotFound` (User) - the buyer's account no longer exists
    pub async fn place_order(&self, buyer_id: &str, product_id: &str) -> DbResult<Order> {
        validate_id("productId", product_id)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let claimed: Option<(String, Money)> = sqlx::query_as(
            r#"
            UPDATE products
            SET status = 'sold', updated_at = ?1
            WHERE id = ?2 AND status = 'available' AND owner_id <> ?3
            RETURNING owner_id, price_cents
            "#,
        )
        .bind(now)
        .bind(product_id)
        .bind(buyer_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((seller_id, price)) = claimed else {
            let product: Option<(String, ProductStatus)> =
                sqlx::query_as("SELECT owner_id, status FROM products WHERE id = ?1")
                    .bind(product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;

            let check = classify_purchase(
                product.as_ref().map(|(owner, status)| (owner.as_str(), *status)),
                buyer_id,
            );
            warn!(
                buyer_id = %buyer_id,
                product_id = %product_id,
                check = ?check,
                "Order rejected"
            );

            check.into_result(product_id)?;
            // The checks passed yet the claim matched nothing.
            return Err(DbError::TransactionFailed(format!(
                "product {product_id} could not be claimed"
            )));
        };

        let order = Order {
            id: Uuid::new_v4().to_string(),
            buyer_id: buyer_id.to_string(),
            seller_id,
            product_id: product_id.to_string(),
            total_amount: price,
            status: OrderStatus::Completed,
            created_at: now,
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO orders (id, buyer_id, seller_id, product_id, total_cents, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&order.id)
        .bind(&order.buyer_id)
        .bind(&order.seller_id)
        .bind(&order.product_id)
        .bind(order.total_amount)
        .bind(order.status)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await;

        // A token can outlive its account. Dropping `tx` releases the claim.
        if let Err(err) = inserted {
            return match DbError::from(err) {
                DbError::ForeignKeyViolation { .. } => {
                    warn!(
                        buyer_id = %buyer_id,
                        product_id = %product_id,
                        "Order from unknown buyer"
                    );
                    Err(CoreError::not_found("User", buyer_id).into())
                }
                e => Err(e),
            };
        }

        let purged = sqlx::query("DELETE FROM cart_items WHERE product_id = ?1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        info!(
            order_id = %order.id,
            buyer_id = %order.buyer_id,
            seller_id = %order.seller_id,
            product_id = %order.product_id,
            total = %order.total_amount,
            cart_rows_purged = purged,
            "Order placed"
        );

        Ok(order)
    }

    /// The buyer's orders, newest first, with product title/image and the
    /// seller's email.
    pub async fn list_for_buyer(&self, buyer_id: &str) -> DbResult<Vec<OrderSummary>> {
        let orders = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT
                o.id, o.total_cents, o.status, o.created_at,
                p.id AS product_id, p.title, p.image_url,
                s.email AS seller_email
            FROM orders o
            JOIN products p ON p.id = o.product_id
            JOIN users s ON s.id = o.seller_id
            WHERE o.buyer_id = ?1
            ORDER BY o.created_at DESC, o.rowid DESC
            "#,
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, buyer_id, seller_id, product_id, total_cents, status, created_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{listing, memory_db, user};
    use ecofinds_core::NewCartItem;

    #[tokio::test]
    async fn test_place_order_marks_sold_and_captures_price() {
        let db = memory_db().await;
        let seller = user(&db, "seller@example.com").await;
        let buyer = user(&db, "buyer@example.com").await;
        let bike = listing(&db, &seller, "Bike", 2000).await;

        let order = db.orders().place_order(&buyer.id, &bike.id).await.unwrap();
        assert_eq!(order.buyer_id, buyer.id);
        assert_eq!(order.seller_id, seller.id);
        assert_eq!(order.total_amount.to_string(), "20.00");
        assert_eq!(order.status, OrderStatus::Completed);

        let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored, order);

        let product = db.products().get_by_id(&bike.id).await.unwrap().unwrap();
        assert_eq!(product.status, ProductStatus::Sold);
    }

    #[tokio::test]
    async fn test_place_order_purges_every_cart() {
        let db = memory_db().await;
        let seller = user(&db, "seller@example.com").await;
        let u2 = user(&db, "u2@example.com").await;
        let u3 = user(&db, "u3@example.com").await;
        let bike = listing(&db, &seller, "Bike", 2000).await;

        for u in [&u2, &u3] {
            db.cart()
                .add(
                    &u.id,
                    NewCartItem {
                        product_id: bike.id.clone(),
                        quantity: None,
                    },
                )
                .await
                .unwrap();
        }

        db.orders().place_order(&u2.id, &bike.id).await.unwrap();

        assert!(db.cart().list(&u2.id).await.unwrap().is_empty());
        assert!(db.cart().list(&u3.id).await.unwrap().is_empty());

        let err = db.orders().place_order(&u3.id, &bike.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_own_product_is_rejected_without_side_effects() {
        let db = memory_db().await;
        let seller = user(&db, "seller@example.com").await;
        let bike = listing(&db, &seller, "Bike", 2000).await;

        let err = db.orders().place_order(&seller.id, &bike.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidOperation(_))));

        let product = db.products().get_by_id(&bike.id).await.unwrap().unwrap();
        assert_eq!(product.status, ProductStatus::Available);
        assert!(db.orders().list_for_buyer(&seller.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let db = memory_db().await;
        let buyer = user(&db, "buyer@example.com").await;

        let err = db.orders().place_order(&buyer.id, "missing").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_deleted_buyer_is_not_found_and_listing_stays_available() {
        let db = memory_db().await;
        let seller = user(&db, "seller@example.com").await;
        let bike = listing(&db, &seller, "Bike", 2000).await;

        let err = db.orders().place_order("ghost", &bike.id).await.unwrap_err();
        match err {
            DbError::Domain(CoreError::NotFound { entity, id }) => {
                assert_eq!(entity, "User");
                assert_eq!(id, "ghost");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let product = db.products().get_by_id(&bike.id).await.unwrap().unwrap();
        assert_eq!(product.status, ProductStatus::Available);
        assert!(db.orders().list_for_buyer("ghost").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_for_buyer_newest_first() {
        let db = memory_db().await;
        let seller = user(&db, "seller@example.com").await;
        let buyer = user(&db, "buyer@example.com").await;
        let lamp = listing(&db, &seller, "Lamp", 1500).await;
        let desk = listing(&db, &seller, "Desk", 9000).await;

        db.orders().place_order(&buyer.id, &lamp.id).await.unwrap();
        db.orders().place_order(&buyer.id, &desk.id).await.unwrap();

        let orders = db.orders().list_for_buyer(&buyer.id).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].title, "Desk");
        assert_eq!(orders[0].total_amount.cents(), 9000);
        assert_eq!(orders[0].seller_email, "seller@example.com");
        assert_eq!(orders[1].title, "Lamp");

        assert!(db.orders().list_for_buyer(&seller.id).await.unwrap().is_empty());
    }
}
