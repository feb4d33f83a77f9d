//! # Product Repository
//!
//! Database operations for listings.
//!
//! ## Key Operations
//! - Browse/search of available listings
//! - Create, read, owner-only edit and delete
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /api/products?search=lamp&category=3&userId=u1                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WHERE status = 'available'                                             │
//! │    AND (?1 IS NULL OR LOWER(title) LIKE ?1 OR LOWER(description) ...)   │
//! │    AND (?2 IS NULL OR category_id = ?2)                                 │
//! │    AND (?3 IS NULL OR owner_id = ?3)                                    │
//! │  ORDER BY created_at DESC                                               │
//! │                                                                         │
//! │  Plain substring match; `%` and `_` in the query are escaped.           │
//! │  No relevance ranking.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use ecofinds_core::rules::{apply_product_update, ensure_owner};
use ecofinds_core::validation::{
    validate_description, validate_image_url, validate_price, validate_search_query,
    validate_title,
};
use ecofinds_core::{
    CoreError, NewProduct, Patch, Product, ProductListing, ProductSearch, ProductStatus,
    ProductUpdate, ValidationError, ALL_CATEGORIES,
};

/// Columns of a [`ProductListing`] row.
const LISTING_SELECT: &str = r#"
    SELECT
        p.id, p.owner_id, p.title, p.description, p.price_cents, p.category_id,
        p.image_url, p.status, p.created_at, p.updated_at,
        c.name AS category_name,
        u.email AS seller_email
    FROM products p
    JOIN users u ON u.id = p.owner_id
    LEFT JOIN categories c ON c.id = p.category_id
"#;

const PRODUCT_SELECT: &str = r#"
    SELECT id, owner_id, title, description, price_cents, category_id,
           image_url, status, created_at, updated_at
    FROM products
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

/// Escapes LIKE wildcards so user input matches literally (`ESCAPE '\'`).
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Parses the `category` filter. Empty or `"all"` means no filter.
fn category_filter(category: Option<&str>) -> DbResult<Option<i64>> {
    match category.map(str::trim) {
        None | Some("") => Ok(None),
        Some(c) if c.eq_ignore_ascii_case(ALL_CATEGORIES) => Ok(None),
        Some(c) => c.parse::<i64>().map(Some).map_err(|_| {
            ValidationError::InvalidFormat {
                field: "category".to_string(),
                reason: "must be a category id or 'all'".to_string(),
            }
            .into()
        }),
    }
}

fn trimmed_non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    async fn ensure_category_exists(&self, category_id: i64) -> DbResult<()> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?1")
            .bind(category_id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Err(ValidationError::UnknownReference {
                field: "categoryId".to_string(),
                value: category_id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Browses available listings.
    pub async fn search(&self, filter: &ProductSearch) -> DbResult<Vec<ProductListing>> {
        let text = match filter.search.as_deref() {
            Some(q) => Some(validate_search_query(q)?).filter(|q| !q.is_empty()),
            None => None,
        };
        let pattern = text.as_deref().map(like_pattern);
        let category_id = category_filter(filter.category.as_deref())?;
        let owner_id = filter
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());

        debug!(
            search = ?text,
            category_id = ?category_id,
            owner_id = ?owner_id,
            "Searching products"
        );

        let sql = format!(
            r#"{LISTING_SELECT}
            WHERE p.status = 'available'
              AND (?1 IS NULL
                   OR LOWER(p.title) LIKE ?1 ESCAPE '\'
                   OR LOWER(COALESCE(p.description, '')) LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR p.category_id = ?2)
              AND (?3 IS NULL OR p.owner_id = ?3)
            ORDER BY p.created_at DESC, p.rowid DESC
            "#
        );

        let listings = sqlx::query_as::<_, ProductListing>(&sql)
            .bind(pattern)
            .bind(category_id)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(listings)
    }

    /// Gets a product by ID (any status).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("{PRODUCT_SELECT} WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product with category name and seller email. Sold listings are
    /// still returned.
    pub async fn get_listing(&self, id: &str) -> DbResult<ProductListing> {
        let sql = format!("{LISTING_SELECT} WHERE p.id = ?1");
        sqlx::query_as::<_, ProductListing>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", id).into())
    }

    /// Creates a listing owned by `owner_id`. New listings are available.
    pub async fn create(&self, owner_id: &str, new: NewProduct) -> DbResult<Product> {
        validate_title(&new.title)?;
        validate_price(new.price)?;
        let description = trimmed_non_empty(new.description);
        if let Some(d) = &description {
            validate_description(d)?;
        }
        let image_url = trimmed_non_empty(new.image_url);
        if let Some(u) = &image_url {
            validate_image_url(u)?;
        }
        if let Some(category_id) = new.category_id {
            self.ensure_category_exists(category_id).await?;
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            title: new.title.trim().to_string(),
            description,
            price: new.price,
            category_id: new.category_id,
            image_url,
            status: ProductStatus::Available,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (
                id, owner_id, title, description, price_cents, category_id,
                image_url, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.owner_id)
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.category_id)
        .bind(&product.image_url)
        .bind(product.status)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %product.id, owner_id = %owner_id, price = %product.price, "Product listed");
        Ok(product)
    }

    /// Applies a partial edit on behalf of `actor_id`.
    ///
    /// ## Steps (one transaction)
    /// 1. Touch `updated_at` to take the write lock. NotFound if no row
    /// 2. Re-read the row under the lock
    /// 3. Owner check (Forbidden), then [`apply_product_update`]
    /// 4. Write every column back and commit
    ///
    /// Any failure after step 1 drops the transaction, which rolls back the
    /// touch.
    pub async fn update(
        &self,
        actor_id: &str,
        product_id: &str,
        update: ProductUpdate,
    ) -> DbResult<Product> {
        if let Patch::Value(category_id) = &update.category_id {
            self.ensure_category_exists(*category_id).await?;
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let touched = sqlx::query("UPDATE products SET updated_at = ?1 WHERE id = ?2")
            .bind(now)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(CoreError::not_found("Product", product_id).into());
        }

        let sql = format!("{PRODUCT_SELECT} WHERE id = ?1");
        let mut product = sqlx::query_as::<_, Product>(&sql)
            .bind(product_id)
            .fetch_one(&mut *tx)
            .await?;

        if let Err(e) = ensure_owner(&product.owner_id, actor_id, "product") {
            warn!(product_id = %product_id, actor_id = %actor_id, "Rejected edit by non-owner");
            return Err(e.into());
        }

        apply_product_update(&mut product, update)?;

        sqlx::query(
            r#"
            UPDATE products SET
                title = ?2,
                description = ?3,
                price_cents = ?4,
                category_id = ?5,
                image_url = ?6,
                status = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.category_id)
        .bind(&product.image_url)
        .bind(product.status)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id = %product.id, status = product.status.as_str(), "Product updated");
        Ok(product)
    }

    /// Deletes a listing on behalf of `actor_id`.
    ///
    /// Cart rows go with it (`ON DELETE CASCADE`). A listing that has been
    /// ordered is kept for the order history and fails with Conflict.
    pub async fn delete(&self, actor_id: &str, product_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1 AND owner_id = ?2")
            .bind(product_id)
            .bind(actor_id)
            .execute(&self.pool)
            .await;

        let deleted = match result {
            Ok(r) => r.rows_affected(),
            Err(err) => {
                return match DbError::from(err) {
                    DbError::ForeignKeyViolation { .. } => Err(CoreError::conflict(
                        "Product has been ordered and cannot be deleted",
                    )
                    .into()),
                    e => Err(e),
                }
            }
        };

        if deleted == 0 {
            let product = self
                .get_by_id(product_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Product", product_id))?;
            ensure_owner(&product.owner_id, actor_id, "product")?;
            return Err(DbError::Internal(format!(
                "product {product_id} was not deleted"
            )));
        }

        info!(id = %product_id, "Product deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
