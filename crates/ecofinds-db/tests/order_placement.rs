//! Order placement against a real SQLite store: single sale, cart purge and
//! concurrent buyers.

use ecofinds_core::{
    CoreError, Money, NewCartItem, NewProduct, Patch, Product, ProductStatus, ProductUpdate, User,
};
use ecofinds_db::{Database, DbConfig, DbError};

async fn user(db: &Database, email: &str) -> User {
    db.users().create(email, "hash", None).await.unwrap()
}

async fn listing(db: &Database, owner: &User, title: &str, price: &str) -> Product {
    db.products()
        .create(
            &owner.id,
            NewProduct {
                title: title.to_string(),
                price: price.parse().unwrap(),
                description: None,
                category_id: None,
                image_url: None,
            },
        )
        .await
        .unwrap()
}

async fn add_to_cart(db: &Database, user: &User, product: &Product) {
    db.cart()
        .add(
            &user.id,
            NewCartItem {
                product_id: product.id.clone(),
                quantity: None,
            },
        )
        .await
        .unwrap();
}

async fn order_count(db: &Database) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(db.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_sale_with_two_interested_buyers() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let u1 = user(&db, "u1@example.com").await;
    let u2 = user(&db, "u2@example.com").await;
    let u3 = user(&db, "u3@example.com").await;
    let p = listing(&db, &u1, "Camera", "20.00").await;

    add_to_cart(&db, &u2, &p).await;
    add_to_cart(&db, &u3, &p).await;

    let order = db.orders().place_order(&u2.id, &p.id).await.unwrap();
    assert_eq!(order.total_amount.to_string(), "20.00");
    assert_eq!(order.seller_id, u1.id);

    let product = db.products().get_by_id(&p.id).await.unwrap().unwrap();
    assert_eq!(product.status, ProductStatus::Sold);
    assert!(db.cart().list(&u2.id).await.unwrap().is_empty());
    assert!(db.cart().list(&u3.id).await.unwrap().is_empty());

    let err = db.orders().place_order(&u3.id, &p.id).await.unwrap_err();
    assert!(matches!(err, DbError::Domain(CoreError::Conflict(_))));
    assert_eq!(order_count(&db).await, 1);

    // Sold listings drop out of browse but stay readable.
    let listings = db.products().search(&Default::default()).await.unwrap();
    assert!(listings.iter().all(|l| l.product.id != p.id));
    assert_eq!(
        db.products().get_listing(&p.id).await.unwrap().product.status,
        ProductStatus::Sold
    );
}

#[tokio::test]
async fn test_price_edit_after_sale_keeps_order_total() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let seller = user(&db, "seller@example.com").await;
    let buyer = user(&db, "buyer@example.com").await;
    let p = listing(&db, &seller, "Camera", "20.00").await;

    let order = db.orders().place_order(&buyer.id, &p.id).await.unwrap();

    db.products()
        .update(
            &seller.id,
            &p.id,
            ProductUpdate {
                price: Patch::Value(Money::from_cents(9999)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.total_amount, Money::from_cents(2000));
    let history = db.orders().list_for_buyer(&buyer.id).await.unwrap();
    assert_eq!(history[0].total_amount.to_string(), "20.00");
}

#[tokio::test]
async fn test_rejected_orders_leave_no_trace() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let seller = user(&db, "seller@example.com").await;
    let buyer = user(&db, "buyer@example.com").await;
    let p = listing(&db, &seller, "Camera", "20.00").await;
    add_to_cart(&db, &buyer, &p).await;

    let err = db.orders().place_order(&seller.id, &p.id).await.unwrap_err();
    assert!(matches!(err, DbError::Domain(CoreError::InvalidOperation(_))));

    let err = db
        .orders()
        .place_order(&buyer.id, "00000000-0000-0000-0000-000000000000")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));

    assert_eq!(order_count(&db).await, 0);
    let product = db.products().get_by_id(&p.id).await.unwrap().unwrap();
    assert_eq!(product.status, ProductStatus::Available);
    assert_eq!(product.updated_at, p.updated_at);
    assert_eq!(db.cart().list(&buyer.id).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_buyers_exactly_one_wins() {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("race.db")).max_connections(8);
    let db = Database::new(config).await.unwrap();

    let seller = user(&db, "seller@example.com").await;
    let p = listing(&db, &seller, "Camera", "20.00").await;

    let mut buyers = Vec::new();
    for i in 0..6 {
        let buyer = user(&db, &format!("buyer{i}@example.com")).await;
        add_to_cart(&db, &buyer, &p).await;
        buyers.push(buyer);
    }

    let handles: Vec<_> = buyers
        .iter()
        .map(|buyer| {
            let db = db.clone();
            let buyer_id = buyer.id.clone();
            let product_id = p.id.clone();
            tokio::spawn(async move { db.orders().place_order(&buyer_id, &product_id).await })
        })
        .collect();

    let mut won = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(order) => {
                won += 1;
                assert_eq!(order.total_amount.cents(), 2000);
            }
            Err(DbError::Domain(CoreError::Conflict(_))) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(won, 1);
    assert_eq!(conflicts, buyers.len() - 1);
    assert_eq!(order_count(&db).await, 1);

    let cart_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_items")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(cart_rows, 0);

    db.close().await;
}
