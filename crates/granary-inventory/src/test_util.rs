//! Shared fixtures: an in-memory database (single connection, since each
//! SQLite :memory: connection is its own database) with the real schema.

use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

pub(crate) async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    granary_platform::init_schema(&pool).await.unwrap();
    pool
}

pub(crate) async fn seed_product(
    pool: &SqlitePool,
    brand: &str,
    product_code: &str,
    barcode: Option<&str>,
) -> i64 {
    seed_product_full(pool, brand, product_code, barcode, None, None).await
}

pub(crate) async fn seed_product_full(
    pool: &SqlitePool,
    brand: &str,
    product_code: &str,
    barcode: Option<&str>,
    seed_size: Option<&str>,
    package_type: Option<&str>,
) -> i64 {
    let row = sqlx::query(
        r#"
        INSERT INTO products (barcode, brand, product_code, seed_size, package_type,
                              units_per_package, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
        RETURNING id
        "#,
    )
    .bind(barcode)
    .bind(brand)
    .bind(product_code)
    .bind(seed_size)
    .bind(package_type)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .unwrap();
    row.try_get("id").unwrap()
}

pub(crate) async fn seed_layout(pool: &SqlitePool) {
    crate::locations::regenerate(pool).await.unwrap();
}
