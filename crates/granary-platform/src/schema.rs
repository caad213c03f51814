use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

/// Idempotent schema. The partial unique index is the storage-level backstop
/// for the one-unit-per-slot rule; the 9999 sentinel pool is exempt.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        barcode TEXT UNIQUE,
        brand TEXT NOT NULL,
        product_code TEXT NOT NULL,
        seed_size TEXT,
        package_type TEXT,
        units_per_package INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS locations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        label TEXT NOT NULL UNIQUE,
        zone TEXT NOT NULL,
        row_index INTEGER NOT NULL,
        col_index INTEGER NOT NULL,
        tier TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        product_id INTEGER NOT NULL REFERENCES products(id),
        location_id INTEGER NOT NULL DEFAULT 9999 REFERENCES locations(id),
        lot TEXT,
        owner TEXT,
        staged INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS outbound_log (
        id TEXT PRIMARY KEY,
        inventory_id INTEGER NOT NULL,
        product_id INTEGER NOT NULL,
        brand TEXT NOT NULL,
        product_code TEXT NOT NULL,
        lot TEXT,
        owner TEXT,
        location_label TEXT NOT NULL,
        dispatched_by TEXT NOT NULL,
        dispatched_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_inventory_one_per_slot
    ON inventory (location_id)
    WHERE location_id <> 9999
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_inventory_product
    ON inventory (product_id)
    "#,
];

/// Creates all tables and seeds the UNASSIGNED sentinel location. Safe to
/// run on every boot.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO locations (id, label, zone, row_index, col_index, tier, created_at)
        VALUES (9999, 'UNASSIGNED', 'UNASSIGNED', 0, 0, NULL, ?1)
        "#,
    )
    .bind(Utc::now())
    .execute(pool)
    .await?;

    info!("database schema ready");
    Ok(())
}
