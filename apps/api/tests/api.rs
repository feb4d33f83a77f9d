//! End-to-end tests: the router is served on an ephemeral port over an
//! in-memory database and driven with reqwest.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use ecofinds_api::{app, ApiConfig, AppState};
use ecofinds_db::{Database, DbConfig};

struct TestApp {
    address: String,
    client: Client,
}

impl TestApp {
    async fn spawn() -> TestApp {
        let config = ApiConfig::defaults().unwrap();
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = Arc::new(AppState::new(config, db));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app(state)).await.unwrap();
        });

        TestApp {
            address: format!("http://127.0.0.1:{port}"),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Registers a user and returns `(token, user_id)`.
    async fn register(&self, email: &str) -> (String, String) {
        let res = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({ "email": email, "password": "password123" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    async fn create_product(&self, token: &str, title: &str, price: &str) -> Value {
        let res = self
            .client
            .post(self.url("/api/products"))
            .bearer_auth(token)
            .json(&json!({ "title": title, "price": price }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        body["product"].clone()
    }

    async fn add_to_cart(&self, token: &str, product_id: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/cart"))
            .bearer_auth(token)
            .json(&json!({ "productId": product_id }))
            .send()
            .await
            .unwrap()
    }

    async fn order(&self, token: &str, product_id: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/orders"))
            .bearer_auth(token)
            .json(&json!({ "productId": product_id }))
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, token: &str, path: &str) -> Value {
        let res = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;
    let res = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::spawn().await;
    let (_, user_id) = app.register("ann@example.com").await;

    let res = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": "ANN@example.com", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["id"], user_id.as_str());
    assert!(body["token"].as_str().is_some());

    let res = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": "ann@example.com", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "UNAUTHORIZED");

    let res = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({ "email": "ann@example.com", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::spawn().await;

    let res = app.client.get(app.url("/api/cart")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .client
        .get(app.url("/api/orders"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let app = TestApp::spawn().await;
    let (token, _) = app.register("ann@example.com").await;

    let res = app
        .client
        .post(app.url("/api/products"))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_purchase_scenario() {
    let app = TestApp::spawn().await;
    let (u1, u1_id) = app.register("u1@example.com").await;
    let (u2, u2_id) = app.register("u2@example.com").await;
    let (u3, _) = app.register("u3@example.com").await;

    let product = app.create_product(&u1, "Camera", "20.00").await;
    let product_id = product["id"].as_str().unwrap();
    assert_eq!(product["price"], "20.00");
    assert_eq!(product["status"], "available");

    assert_eq!(app.add_to_cart(&u2, product_id).await.status(), StatusCode::CREATED);
    assert_eq!(app.add_to_cart(&u3, product_id).await.status(), StatusCode::CREATED);
    assert_eq!(app.add_to_cart(&u3, product_id).await.status(), StatusCode::CONFLICT);

    // Sellers cannot buy their own listing.
    let res = app.order(&u1, product_id).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = app.order(&u2, product_id).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    let order = &body["order"];
    assert_eq!(order["buyer_id"], u2_id.as_str());
    assert_eq!(order["seller_id"], u1_id.as_str());
    assert_eq!(order["product_id"], product_id);
    assert_eq!(order["total_amount"], "20.00");
    assert_eq!(order["status"], "completed");

    let cart = app.get(&u2, "/api/cart").await;
    assert_eq!(cart["cartItems"].as_array().unwrap().len(), 0);
    let cart = app.get(&u3, "/api/cart").await;
    assert_eq!(cart["cartItems"].as_array().unwrap().len(), 0);

    let res = app.order(&u3, product_id).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "CONFLICT");

    let detail = app.get(&u3, &format!("/api/products/{product_id}")).await;
    assert_eq!(detail["product"]["status"], "sold");

    let orders = app.get(&u2, "/api/orders").await;
    let orders = orders["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["title"], "Camera");
    assert_eq!(orders[0]["seller_email"], "u1@example.com");
}

#[tokio::test]
async fn test_order_unknown_product_is_not_found() {
    let app = TestApp::spawn().await;
    let (token, _) = app.register("ann@example.com").await;

    let res = app.order(&token, "does-not-exist").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_product_edit_and_delete_ownership() {
    let app = TestApp::spawn().await;
    let (owner, _) = app.register("owner@example.com").await;
    let (other, _) = app.register("other@example.com").await;
    let product = app.create_product(&owner, "Lamp", "12.50").await;
    let path = format!("/api/products/{}", product["id"].as_str().unwrap());

    let res = app
        .client
        .put(app.url(&path))
        .bearer_auth(&other)
        .json(&json!({ "title": "Mine now" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .client
        .put(app.url(&path))
        .bearer_auth(&owner)
        .json(&json!({ "price": "10.00", "description": "Warm light" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["product"]["price"], "10.00");
    assert_eq!(body["product"]["title"], "Lamp");
    assert_eq!(body["product"]["description"], "Warm light");

    let res = app
        .client
        .put(app.url(&path))
        .bearer_auth(&owner)
        .json(&json!({ "title": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .client
        .delete(app.url(&path))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .client
        .delete(app.url(&path))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.client.get(app.url(&path)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_browse_filters_and_categories() {
    let app = TestApp::spawn().await;
    let (ann, ann_id) = app.register("ann@example.com").await;
    let (bob, _) = app.register("bob@example.com").await;
    app.create_product(&ann, "Brass lamp", "15.00").await;
    app.create_product(&bob, "Oak chair", "40.00").await;

    let body: Value = app
        .client
        .get(app.url("/api/categories"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!body["categories"].as_array().unwrap().is_empty());

    let body: Value = app
        .client
        .get(app.url("/api/products?search=LAMP&category=all"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["title"], "Brass lamp");
    assert_eq!(products[0]["seller_email"], "ann@example.com");

    let body: Value = app
        .client
        .get(app.url(&format!("/api/products?userId={ann_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["products"].as_array().unwrap().len(), 1);

    let res = app
        .client
        .get(app.url("/api/products?category=shoes"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_remove_and_profile() {
    let app = TestApp::spawn().await;
    let (seller, _) = app.register("seller@example.com").await;
    let (buyer, buyer_id) = app.register("buyer@example.com").await;
    let (other, _) = app.register("other@example.com").await;
    let product = app.create_product(&seller, "Desk", "55.00").await;

    let res = app.add_to_cart(&buyer, product["id"].as_str().unwrap()).await;
    let body: Value = res.json().await.unwrap();
    let item_path = format!("/api/cart/{}", body["cartItem"]["id"].as_str().unwrap());

    let res = app
        .client
        .delete(app.url(&item_path))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .client
        .delete(app.url(&item_path))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let profile = app.get(&buyer, "/api/profile").await;
    assert_eq!(profile["profile"]["id"], buyer_id.as_str());
    assert!(profile["profile"]["username"].is_null());

    let res = app
        .client
        .put(app.url("/api/profile"))
        .bearer_auth(&buyer)
        .json(&json!({ "name": "Buyer", "username": "buyer_1", "phone": "555 0100" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["profile"]["name"], "Buyer");
    assert_eq!(body["profile"]["username"], "buyer_1");
    assert_eq!(body["profile"]["phone"], "555 0100");
    assert!(body["profile"]["address"].is_null());
}
