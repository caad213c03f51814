//! The inventory ledger: one row per discrete physical unit.
//!
//! Receiving N units inserts N rows into the UNASSIGNED pool; staging marks
//! units for a customer; the list views join product and location display
//! fields for the UI.

use chrono::Utc;
use granary_core::{UNASSIGNED_LOCATION_ID, UnitView};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{InventoryError, InventoryResult};

pub(crate) const UNIT_VIEW_SELECT: &str = r#"
    SELECT
        i.id,
        i.product_id,
        i.location_id,
        i.lot,
        i.owner,
        i.staged,
        p.brand,
        p.product_code,
        p.seed_size,
        p.package_type,
        p.units_per_package,
        p.barcode,
        l.label AS location_label,
        l.zone
    FROM inventory i
    JOIN products p ON p.id = i.product_id
    JOIN locations l ON l.id = i.location_id
"#;

pub(crate) fn unit_view_from_row(row: &SqliteRow) -> Result<UnitView, sqlx::Error> {
    Ok(UnitView {
        id: row.try_get("id")?,
        product_id: row.try_get("product_id")?,
        location_id: row.try_get("location_id")?,
        lot: row.try_get("lot")?,
        owner: row.try_get("owner")?,
        staged: row.try_get("staged")?,
        brand: row.try_get("brand")?,
        product_code: row.try_get("product_code")?,
        seed_size: row.try_get("seed_size")?,
        package_type: row.try_get("package_type")?,
        units_per_package: row.try_get("units_per_package")?,
        barcode: row.try_get("barcode")?,
        location_label: row.try_get("location_label")?,
        zone: row.try_get("zone")?,
    })
}

/// Optional filters for the unit search view. Text fields match by
/// case-insensitive substring, size and package exactly.
#[derive(Debug, Clone, Default)]
pub struct UnitFilter {
    pub brand: Option<String>,
    pub product: Option<String>,
    pub size: Option<String>,
    pub package_type: Option<String>,
    pub lot: Option<String>,
}

/// Inserts `qty` independent unit rows into the UNASSIGNED pool and returns
/// their ids.
pub async fn receive(
    pool: &SqlitePool,
    product_id: i64,
    qty: i64,
    owner: Option<&str>,
    lot: Option<&str>,
) -> InventoryResult<Vec<i64>> {
    if qty <= 0 {
        return Err(InventoryError::invalid("qty must be a positive integer"));
    }

    let product_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = ?1)")
            .bind(product_id)
            .fetch_one(pool)
            .await?;
    if !product_exists {
        return Err(InventoryError::not_found("product", product_id));
    }

    let now = Utc::now();
    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(qty as usize);
    for _ in 0..qty {
        let row = sqlx::query(
            r#"
            INSERT INTO inventory (product_id, location_id, lot, owner, staged, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)
            RETURNING id
            "#,
        )
        .bind(product_id)
        .bind(UNASSIGNED_LOCATION_ID)
        .bind(lot)
        .bind(owner)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        ids.push(row.try_get("id")?);
    }
    tx.commit().await?;

    debug!(product_id, count = ids.len(), "units received into the pool");
    Ok(ids)
}

/// Removes one unit. Does not cascade to the product or location.
pub async fn delete_unit(pool: &SqlitePool, id: i64) -> InventoryResult<()> {
    let result = sqlx::query("DELETE FROM inventory WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(InventoryError::not_found("inventory unit", id));
    }
    Ok(())
}

/// Marks units as held for a customer pending dispatch. Returns how many
/// rows matched.
pub async fn stage(pool: &SqlitePool, ids: &[i64], customer: &str) -> InventoryResult<i64> {
    let customer = customer.trim();
    if customer.is_empty() {
        return Err(InventoryError::invalid("customer is required"));
    }
    if ids.is_empty() {
        return Err(InventoryError::invalid("inventory_ids must not be empty"));
    }

    let now = Utc::now();
    let mut tx = pool.begin().await?;
    let mut staged = 0i64;
    for id in ids {
        let result =
            sqlx::query("UPDATE inventory SET staged = 1, owner = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(customer)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        staged += result.rows_affected() as i64;
    }
    tx.commit().await?;

    debug!(staged, customer, "units staged");
    Ok(staged)
}

/// Clears the staged flag and the owner on the given units.
pub async fn unstage(pool: &SqlitePool, ids: &[i64]) -> InventoryResult<i64> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;
    let mut unstaged = 0i64;
    for id in ids {
        let result = sqlx::query(
            "UPDATE inventory SET staged = 0, owner = NULL, updated_at = ?1 WHERE id = ?2",
        )
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        unstaged += result.rows_affected() as i64;
    }
    tx.commit().await?;

    debug!(unstaged, "units unstaged");
    Ok(unstaged)
}

pub async fn list_all(pool: &SqlitePool) -> InventoryResult<Vec<UnitView>> {
    let sql = format!("{UNIT_VIEW_SELECT} ORDER BY i.id");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    collect_views(rows)
}

/// Units still sitting in the UNASSIGNED intake pool.
pub async fn list_unassigned(pool: &SqlitePool) -> InventoryResult<Vec<UnitView>> {
    let sql = format!("{UNIT_VIEW_SELECT} WHERE i.location_id = ?1 ORDER BY i.id");
    let rows = sqlx::query(&sql)
        .bind(UNASSIGNED_LOCATION_ID)
        .fetch_all(pool)
        .await?;
    collect_views(rows)
}

pub async fn list_for_location(
    pool: &SqlitePool,
    location_id: i64,
) -> InventoryResult<Vec<UnitView>> {
    let sql = format!("{UNIT_VIEW_SELECT} WHERE i.location_id = ?1 ORDER BY i.id");
    let rows = sqlx::query(&sql).bind(location_id).fetch_all(pool).await?;
    collect_views(rows)
}

pub async fn list_for_product(
    pool: &SqlitePool,
    product_id: i64,
) -> InventoryResult<Vec<UnitView>> {
    let sql = format!("{UNIT_VIEW_SELECT} WHERE i.product_id = ?1 ORDER BY i.id");
    let rows = sqlx::query(&sql).bind(product_id).fetch_all(pool).await?;
    collect_views(rows)
}

/// Filtered unit view over any combination of product fields and lot.
pub async fn search(pool: &SqlitePool, filter: &UnitFilter) -> InventoryResult<Vec<UnitView>> {
    let sql = format!(
        r#"
        {UNIT_VIEW_SELECT}
        WHERE (?1 IS NULL OR p.brand LIKE '%' || ?1 || '%')
          AND (?2 IS NULL OR p.product_code LIKE '%' || ?2 || '%')
          AND (?3 IS NULL OR p.seed_size = ?3)
          AND (?4 IS NULL OR p.package_type = ?4)
          AND (?5 IS NULL OR i.lot LIKE '%' || ?5 || '%')
        ORDER BY i.id
        "#
    );
    let rows = sqlx::query(&sql)
        .bind(&filter.brand)
        .bind(&filter.product)
        .bind(&filter.size)
        .bind(&filter.package_type)
        .bind(&filter.lot)
        .fetch_all(pool)
        .await?;
    collect_views(rows)
}

fn collect_views(rows: Vec<SqliteRow>) -> InventoryResult<Vec<UnitView>> {
    let mut views = Vec::with_capacity(rows.len());
    for row in &rows {
        views.push(unit_view_from_row(row)?);
    }
    Ok(views)
}
