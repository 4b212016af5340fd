//! Catalog seeding for tests. Catalog management is not part of the engine, so these write straight to the tables.
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use crate::db_types::{Money, Receiver};

pub async fn create_user(pool: &SqlitePool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (name, avatar) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(format!("https://img.example/{name}.png"))
        .fetch_one(pool)
        .await
        .expect("Error creating user")
}

/// Inserts a user with a specific id. Handy for matching the ids used in scenarios.
pub async fn create_user_with_id(pool: &SqlitePool, id: i64, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (id, name) VALUES ($1, $2) RETURNING id")
        .bind(id)
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("Error creating user")
}

pub async fn create_product(pool: &SqlitePool, shop_id: i64, name: &str, published_at: Option<DateTime<Utc>>) -> i64 {
    sqlx::query_scalar("INSERT INTO products (name, published_at, created_by_id) VALUES ($1, $2, $3) RETURNING id")
        .bind(name)
        .bind(published_at)
        .bind(shop_id)
        .fetch_one(pool)
        .await
        .expect("Error creating product")
}

/// A product that went on sale yesterday.
pub async fn create_live_product(pool: &SqlitePool, shop_id: i64, name: &str) -> i64 {
    create_product(pool, shop_id, name, Some(Utc::now() - Duration::days(1))).await
}

pub async fn add_translation(pool: &SqlitePool, product_id: i64, language_id: &str, name: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO product_translations (product_id, language_id, name, description) VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(product_id)
    .bind(language_id)
    .bind(name)
    .bind(format!("{name} ({language_id})"))
    .fetch_one(pool)
    .await
    .expect("Error creating translation")
}

pub async fn create_sku(pool: &SqlitePool, product_id: i64, shop_id: i64, price: i64, stock: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO skus (product_id, created_by_id, value, price, stock, image) VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id",
    )
    .bind(product_id)
    .bind(shop_id)
    .bind(format!("variant-{price}"))
    .bind(Money::from(price))
    .bind(stock)
    .bind(format!("https://img.example/sku-{product_id}-{price}.png"))
    .fetch_one(pool)
    .await
    .expect("Error creating SKU")
}

/// Inserts a SKU with a specific id.
pub async fn create_sku_with_id(pool: &SqlitePool, id: i64, product_id: i64, shop_id: i64, price: i64, stock: i64) {
    sqlx::query(
        "INSERT INTO skus (id, product_id, created_by_id, value, price, stock) VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(id)
    .bind(product_id)
    .bind(shop_id)
    .bind(format!("variant-{id}"))
    .bind(Money::from(price))
    .bind(stock)
    .execute(pool)
    .await
    .expect("Error creating SKU");
}

/// Makes the next checkout create payment `id`.
pub async fn set_next_payment_id(pool: &SqlitePool, id: i64) {
    sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'payments'")
        .execute(pool)
        .await
        .expect("Error resetting payment ids");
    sqlx::query("INSERT INTO sqlite_sequence (name, seq) VALUES ('payments', $1)")
        .bind(id - 1)
        .execute(pool)
        .await
        .expect("Error setting payment ids");
}

pub async fn sku_stock(pool: &SqlitePool, sku_id: i64) -> i64 {
    sqlx::query_scalar("SELECT stock FROM skus WHERE id = $1")
        .bind(sku_id)
        .fetch_one(pool)
        .await
        .expect("Error fetching SKU stock")
}

pub async fn set_sku_stock(pool: &SqlitePool, sku_id: i64, stock: i64) {
    sqlx::query("UPDATE skus SET stock = $1 WHERE id = $2")
        .bind(stock)
        .bind(sku_id)
        .execute(pool)
        .await
        .expect("Error setting SKU stock");
}

pub async fn soft_delete_sku(pool: &SqlitePool, sku_id: i64) {
    sqlx::query("UPDATE skus SET deleted_at = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(sku_id)
        .execute(pool)
        .await
        .expect("Error deleting SKU");
}

pub async fn soft_delete_product(pool: &SqlitePool, product_id: i64) {
    sqlx::query("UPDATE products SET deleted_at = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(product_id)
        .execute(pool)
        .await
        .expect("Error deleting product");
}

pub async fn count_cart_items(pool: &SqlitePool, user_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("Error counting cart items")
}

pub async fn count_payment_transactions(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM payment_transactions")
        .fetch_one(pool)
        .await
        .expect("Error counting payment transactions")
}

pub fn receiver() -> Receiver {
    Receiver { name: "Nguyen Van An".into(), phone: "0901234567".into(), address: "1 Trang Tien, Hanoi".into() }
}

/// Two shops, each selling one live product with a single SKU, and a buyer.
#[derive(Debug, Clone, Copy)]
pub struct TwoShopCatalog {
    pub buyer: i64,
    pub shop_a: i64,
    pub shop_b: i64,
    pub product_a: i64,
    pub product_b: i64,
    /// Price 100, stock 5
    pub sku_a: i64,
    /// Price 50, stock 3
    pub sku_b: i64,
}

pub async fn seed_two_shops(pool: &SqlitePool) -> TwoShopCatalog {
    let buyer = create_user(pool, "buyer").await;
    let shop_a = create_user(pool, "shop-a").await;
    let shop_b = create_user(pool, "shop-b").await;
    let product_a = create_live_product(pool, shop_a, "Green tea").await;
    add_translation(pool, product_a, "en", "Green tea").await;
    add_translation(pool, product_a, "vi", "Trà xanh").await;
    let product_b = create_live_product(pool, shop_b, "Coffee beans").await;
    add_translation(pool, product_b, "en", "Coffee beans").await;
    let sku_a = create_sku(pool, product_a, shop_a, 100, 5).await;
    let sku_b = create_sku(pool, product_b, shop_b, 50, 3).await;
    TwoShopCatalog { buyer, shop_a, shop_b, product_a, product_b, sku_a, sku_b }
}
