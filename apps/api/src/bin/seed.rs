//! # Seed Data Generator
//!
//! Populates the database with demo accounts, listings and carts for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed ./data/ecofinds.db
//! cargo run -p ecofinds-api --bin seed
//!
//! # Specify database path
//! cargo run -p ecofinds-api --bin seed -- --db ./data/dev.db
//! ```
//!
//! ## Generated Data
//! - 3 users (`alice`, `bob`, `carol` @example.com), password `password123`
//! - A handful of listings per seller across the seeded categories
//! - Carol's cart holds two of Alice's listings, Bob's cart one of them,
//!   so placing an order shows the cart purge

use std::env;

use anyhow::Context;
use ecofinds_api::auth::hash_password;
use ecofinds_core::{Category, Money, NewCartItem, NewProduct, User};
use ecofinds_db::{Database, DbConfig};

const DEMO_PASSWORD: &str = "password123";

const USERS: &[(&str, &str)] = &[
    ("alice@example.com", "Alice"),
    ("bob@example.com", "Bob"),
    ("carol@example.com", "Carol"),
];

/// (seller index, title, price, category name, description)
const LISTINGS: &[(usize, &str, &str, &str, &str)] = &[
    (0, "Vintage film camera", "20.00", "Electronics", "35mm, tested with one roll"),
    (0, "Oak bookshelf", "45.50", "Furniture", "Five shelves, minor scratches"),
    (0, "Denim jacket", "18.00", "Clothing", "Size M"),
    (1, "Road bike", "150.00", "Sports", "Aluminium frame, new tyres"),
    (1, "Board game bundle", "25.00", "Toys & Games", "Three games, all pieces present"),
    (1, "Paperback novels (10)", "12.00", "Books", "Mixed sci-fi and mystery"),
    (2, "Terracotta planters", "9.99", "Home & Garden", "Set of three"),
    (2, "Bluetooth speaker", "30.00", "Electronics", "Battery lasts about 6 hours"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./data/ecofinds.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("EcoFinds Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./data/ecofinds.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 EcoFinds Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .context("failed to open database")?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.users().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} users", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Users
    println!();
    println!("Creating users...");
    let password_hash = hash_password(DEMO_PASSWORD)?;
    let mut users: Vec<User> = Vec::with_capacity(USERS.len());
    for (email, name) in USERS {
        let user = db.users().create(email, &password_hash, Some(*name)).await?;
        println!("  {} ({})", user.email, user.id);
        users.push(user);
    }

    // Listings
    println!();
    println!("Creating listings...");
    let categories = db.categories().list().await?;
    let mut created = Vec::with_capacity(LISTINGS.len());
    for (seller, title, price, category, description) in LISTINGS {
        let product = db
            .products()
            .create(
                &users[*seller].id,
                NewProduct {
                    title: title.to_string(),
                    price: price.parse::<Money>()?,
                    description: Some(description.to_string()),
                    category_id: category_id(&categories, category),
                    image_url: None,
                },
            )
            .await?;
        println!("  {:<24} {:>8}  by {}", product.title, product.price, users[*seller].email);
        created.push(product);
    }

    // Carts: Carol and Bob both want Alice's camera
    println!();
    println!("Filling carts...");
    let carts = [(2usize, 0usize), (2, 1), (1, 0)];
    for (user_idx, product_idx) in carts {
        db.cart()
            .add(
                &users[user_idx].id,
                NewCartItem {
                    product_id: created[product_idx].id.clone(),
                    quantity: None,
                },
            )
            .await?;
        println!(
            "  {} ← {}",
            users[user_idx].email, created[product_idx].title
        );
    }

    println!();
    println!("✓ Seed complete! Log in with any user and password '{}'", DEMO_PASSWORD);

    Ok(())
}

fn category_id(categories: &[Category], name: &str) -> Option<i64> {
    categories.iter().find(|c| c.name == name).map(|c| c.id)
}
