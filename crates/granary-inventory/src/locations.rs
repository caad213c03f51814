//! The location directory: fixed storage slots plus the UNASSIGNED sentinel.

use chrono::Utc;
use granary_core::{Location, TIERS, UNASSIGNED_LOCATION_ID, default_blocks, generate_layout};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::error::{InventoryError, InventoryResult, is_unique_violation};

const LOCATION_SELECT: &str =
    "SELECT id, label, zone, row_index, col_index, tier, created_at FROM locations";

fn location_from_row(row: &SqliteRow) -> Result<Location, sqlx::Error> {
    Ok(Location {
        id: row.try_get("id")?,
        label: row.try_get("label")?,
        zone: row.try_get("zone")?,
        row_index: row.try_get("row_index")?,
        col_index: row.try_get("col_index")?,
        tier: row.try_get("tier")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn list_all(pool: &SqlitePool) -> InventoryResult<Vec<Location>> {
    let sql = format!("{LOCATION_SELECT} ORDER BY zone, row_index, col_index");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    collect(rows)
}

pub async fn list_by_zone(pool: &SqlitePool, zone: &str) -> InventoryResult<Vec<Location>> {
    let sql = format!("{LOCATION_SELECT} WHERE zone = ?1 ORDER BY row_index, col_index");
    let rows = sqlx::query(&sql).bind(zone).fetch_all(pool).await?;
    collect(rows)
}

/// Exact-label lookup, used by move workflows that assemble a label from
/// zone/row/column/tier selectors.
pub async fn get_by_label(pool: &SqlitePool, label: &str) -> InventoryResult<Location> {
    let sql = format!("{LOCATION_SELECT} WHERE label = ?1");
    let row = sqlx::query(&sql)
        .bind(label)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| InventoryError::not_found("location", label))?;
    Ok(location_from_row(&row)?)
}

/// Adds a single slot outside the generated layout.
pub async fn create(
    pool: &SqlitePool,
    label: &str,
    zone: &str,
    row_index: i64,
    col_index: i64,
    tier: Option<&str>,
) -> InventoryResult<i64> {
    let label = label.trim();
    let zone = zone.trim();
    if label.is_empty() || zone.is_empty() {
        return Err(InventoryError::invalid(
            "label, zone, row_index, and col_index are required",
        ));
    }

    let row = sqlx::query(
        r#"
        INSERT INTO locations (label, zone, row_index, col_index, tier, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        RETURNING id
        "#,
    )
    .bind(label)
    .bind(zone)
    .bind(row_index)
    .bind(col_index)
    .bind(tier)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            InventoryError::invalid(format!("location label {label} already exists"))
        } else {
            err.into()
        }
    })?;

    Ok(row.try_get("id")?)
}

/// Removes one slot. The sentinel is reserved, and a slot holding a unit
/// must be emptied first.
pub async fn delete(pool: &SqlitePool, id: i64) -> InventoryResult<()> {
    if id == UNASSIGNED_LOCATION_ID {
        return Err(InventoryError::invalid(
            "the UNASSIGNED location is reserved and cannot be deleted",
        ));
    }

    let occupied: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM inventory WHERE location_id = ?1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if occupied {
        return Err(InventoryError::invalid(
            "location still holds inventory; move it first",
        ));
    }

    let result = sqlx::query("DELETE FROM locations WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(InventoryError::not_found("location", id));
    }
    Ok(())
}

/// Wipes and regenerates every slot of the fixed floor plan. Destructive:
/// refused while any unit is placed outside the pool. The sentinel row
/// survives regeneration.
pub async fn regenerate(pool: &SqlitePool) -> InventoryResult<i64> {
    let placed: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM inventory WHERE location_id <> ?1)",
    )
    .bind(UNASSIGNED_LOCATION_ID)
    .fetch_one(pool)
    .await?;
    if placed {
        return Err(InventoryError::invalid(
            "inventory is still placed in slots; move it to the pool before regenerating",
        ));
    }

    let slots = generate_layout(&default_blocks(), &TIERS);
    let now = Utc::now();

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM locations WHERE id <> ?1")
        .bind(UNASSIGNED_LOCATION_ID)
        .execute(&mut *tx)
        .await?;

    for slot in &slots {
        sqlx::query(
            r#"
            INSERT INTO locations (label, zone, row_index, col_index, tier, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&slot.label)
        .bind(&slot.zone)
        .bind(slot.row_index)
        .bind(slot.col_index)
        .bind(&slot.tier)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    let total = slots.len() as i64;
    info!(total, "warehouse layout regenerated");
    Ok(total)
}

fn collect(rows: Vec<SqliteRow>) -> InventoryResult<Vec<Location>> {
    let mut locations = Vec::with_capacity(rows.len());
    for row in &rows {
        locations.push(location_from_row(row)?);
    }
    Ok(locations)
}
