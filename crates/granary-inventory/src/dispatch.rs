//! Dispatch: staged units leaving the warehouse are snapshotted into the
//! append-only outbound log and removed from the ledger in one transaction.

use chrono::Utc;
use granary_core::OutboundEntry;
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::error::{InventoryError, InventoryResult};
use crate::ledger::{UNIT_VIEW_SELECT, unit_view_from_row};

/// Dispatches a batch of staged units. All-or-nothing: an unknown id or an
/// unstaged unit rolls the whole batch back before anything is written.
pub async fn dispatch(
    pool: &SqlitePool,
    ids: &[i64],
    dispatched_by: &str,
) -> InventoryResult<i64> {
    let dispatched_by = dispatched_by.trim();
    if dispatched_by.is_empty() {
        return Err(InventoryError::invalid("dispatched_by is required"));
    }
    if ids.is_empty() {
        return Err(InventoryError::invalid("inventory_ids must not be empty"));
    }

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    for id in ids {
        let sql = format!("{UNIT_VIEW_SELECT} WHERE i.id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| InventoryError::not_found("inventory unit", id))?;
        let unit = unit_view_from_row(&row)?;

        if !unit.staged {
            return Err(InventoryError::invalid(format!(
                "unit {id} is not staged for dispatch"
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO outbound_log (id, inventory_id, product_id, brand, product_code,
                                      lot, owner, location_label, dispatched_by, dispatched_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(unit.id)
        .bind(unit.product_id)
        .bind(&unit.brand)
        .bind(&unit.product_code)
        .bind(&unit.lot)
        .bind(&unit.owner)
        .bind(&unit.location_label)
        .bind(dispatched_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM inventory WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    let count = ids.len() as i64;
    info!(count, dispatched_by, "units dispatched");
    Ok(count)
}

/// Recent outbound entries, newest first.
pub async fn list_outbound(
    pool: &SqlitePool,
    limit: Option<i64>,
) -> InventoryResult<Vec<OutboundEntry>> {
    let limit = limit.unwrap_or(100).clamp(1, 500);
    let rows = sqlx::query(
        r#"
        SELECT id, inventory_id, product_id, brand, product_code, lot, owner,
               location_label, dispatched_by, dispatched_at
        FROM outbound_log
        ORDER BY dispatched_at DESC, id
        LIMIT ?1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in &rows {
        entries.push(OutboundEntry {
            id: row.try_get("id")?,
            inventory_id: row.try_get("inventory_id")?,
            product_id: row.try_get("product_id")?,
            brand: row.try_get("brand")?,
            product_code: row.try_get("product_code")?,
            lot: row.try_get("lot")?,
            owner: row.try_get("owner")?,
            location_label: row.try_get("location_label")?,
            dispatched_by: row.try_get("dispatched_by")?,
            dispatched_at: row.try_get("dispatched_at")?,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ledger, test_util};

    #[tokio::test]
    async fn dispatch_snapshots_and_removes_staged_units() {
        let pool = test_util::memory_pool().await;
        let product_id = test_util::seed_product(&pool, "Pioneer", "P1197", None).await;
        let ids = ledger::receive(&pool, product_id, 2, None, Some("LOT-9"))
            .await
            .unwrap();
        ledger::stage(&pool, &ids, "Acme").await.unwrap();

        let count = dispatch(&pool, &ids, "warehouse-1").await.unwrap();
        assert_eq!(count, 2);
        assert!(ledger::list_all(&pool).await.unwrap().is_empty());

        let entries = list_outbound(&pool, None).await.unwrap();
        assert_eq!(entries.len(), 2);
        for entry in &entries {
            assert_eq!(entry.product_id, product_id);
            assert_eq!(entry.brand, "Pioneer");
            assert_eq!(entry.lot.as_deref(), Some("LOT-9"));
            assert_eq!(entry.owner.as_deref(), Some("Acme"));
            assert_eq!(entry.location_label, "UNASSIGNED");
            assert_eq!(entry.dispatched_by, "warehouse-1");
        }
    }

    #[tokio::test]
    async fn unstaged_unit_aborts_the_whole_batch() {
        let pool = test_util::memory_pool().await;
        let product_id = test_util::seed_product(&pool, "Pioneer", "P1197", None).await;
        let ids = ledger::receive(&pool, product_id, 2, None, None).await.unwrap();
        ledger::stage(&pool, &ids[..1], "Acme").await.unwrap();

        let err = dispatch(&pool, &ids, "warehouse-1").await.unwrap_err();
        assert!(matches!(err, InventoryError::InvalidArgument(_)));

        // nothing left the ledger, nothing was logged
        assert_eq!(ledger::list_all(&pool).await.unwrap().len(), 2);
        assert!(list_outbound(&pool, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dispatch_validates_inputs() {
        let pool = test_util::memory_pool().await;

        let err = dispatch(&pool, &[], "warehouse-1").await.unwrap_err();
        assert!(matches!(err, InventoryError::InvalidArgument(_)));

        let err = dispatch(&pool, &[1], "  ").await.unwrap_err();
        assert!(matches!(err, InventoryError::InvalidArgument(_)));

        let err = dispatch(&pool, &[42], "warehouse-1").await.unwrap_err();
        assert!(matches!(err, InventoryError::NotFound { .. }));
    }
}
