//! The placement engine: moving units between slots under the
//! at-most-one-unit-per-slot rule.
//!
//! The UNASSIGNED pool (location 9999) is exempt and unbounded; every other
//! location holds zero or one unit. The occupancy check and the location
//! write are a single conditional UPDATE, so two racing moves into the same
//! empty slot resolve to exactly one winner; the partial unique index on
//! `inventory(location_id)` backstops the same rule at the storage level.

use chrono::Utc;
use granary_core::UNASSIGNED_LOCATION_ID;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{InventoryError, InventoryResult, is_unique_violation};

#[derive(Debug, Clone, Serialize)]
pub struct MoveFailure {
    pub unit_id: i64,
    pub error: String,
}

/// Summary of a batch move: the batch never aborts on the first failure,
/// it keeps issuing the remaining moves and reports per-pair errors.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub moved: i64,
    pub total: i64,
    pub errors: Vec<MoveFailure>,
}

/// Moves one unit into a destination slot. Fails with `NotFound` for an
/// unknown unit or location and `LocationOccupied` for a taken slot;
/// nothing is mutated on failure.
pub async fn move_unit(
    pool: &SqlitePool,
    unit_id: i64,
    destination_id: i64,
) -> InventoryResult<()> {
    let destination = sqlx::query("SELECT label FROM locations WHERE id = ?1")
        .bind(destination_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| InventoryError::not_found("location", destination_id))?;
    let label: String = destination.try_get("label")?;

    let now = Utc::now();
    let result = if destination_id == UNASSIGNED_LOCATION_ID {
        // Returning a unit to the pool never conflicts.
        sqlx::query("UPDATE inventory SET location_id = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(destination_id)
            .bind(now)
            .bind(unit_id)
            .execute(pool)
            .await
    } else {
        sqlx::query(
            r#"
            UPDATE inventory SET location_id = ?1, updated_at = ?2
            WHERE id = ?3
              AND NOT EXISTS (
                  SELECT 1 FROM inventory occupant
                  WHERE occupant.location_id = ?1 AND occupant.id <> ?3
              )
            "#,
        )
        .bind(destination_id)
        .bind(now)
        .bind(unit_id)
        .execute(pool)
        .await
    };

    let result = match result {
        Ok(result) => result,
        Err(err) if is_unique_violation(&err) => {
            return Err(InventoryError::occupied(label));
        }
        Err(err) => return Err(err.into()),
    };

    if result.rows_affected() == 0 {
        let unit_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM inventory WHERE id = ?1)")
                .bind(unit_id)
                .fetch_one(pool)
                .await?;
        if !unit_exists {
            return Err(InventoryError::not_found("inventory unit", unit_id));
        }
        return Err(InventoryError::occupied(label));
    }

    debug!(unit_id, destination = %label, "unit moved");
    Ok(())
}

/// Moves each `(unit, destination)` pair in caller order, collecting
/// per-pair failures instead of aborting.
pub async fn move_batch(pool: &SqlitePool, pairs: &[(i64, i64)]) -> InventoryResult<BatchOutcome> {
    let mut moved = 0i64;
    let mut errors = Vec::new();

    for (unit_id, destination_id) in pairs {
        match move_unit(pool, *unit_id, *destination_id).await {
            Ok(()) => moved += 1,
            Err(err) => errors.push(MoveFailure {
                unit_id: *unit_id,
                error: err.to_string(),
            }),
        }
    }

    debug!(moved, total = pairs.len(), "batch move finished");
    Ok(BatchOutcome {
        moved,
        total: pairs.len() as i64,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ledger, locations, test_util};

    async fn slot_id(pool: &SqlitePool, label: &str) -> i64 {
        locations::get_by_label(pool, label).await.unwrap().id
    }

    #[tokio::test]
    async fn move_into_empty_slot_then_conflict_then_next_tier() {
        let pool = test_util::memory_pool().await;
        test_util::seed_layout(&pool).await;
        let product_id = test_util::seed_product(&pool, "Pioneer", "P1197", None).await;
        let ids = ledger::receive(&pool, product_id, 3, None, None).await.unwrap();

        let top = slot_id(&pool, "C-R1-C1-T").await;
        let middle = slot_id(&pool, "C-R1-C1-M").await;

        move_unit(&pool, ids[0], top).await.unwrap();

        let err = move_unit(&pool, ids[1], top).await.unwrap_err();
        assert!(matches!(err, InventoryError::LocationOccupied { .. }));

        move_unit(&pool, ids[1], middle).await.unwrap();

        let placed = ledger::list_for_location(&pool, top).await.unwrap();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].id, ids[0]);
    }

    #[tokio::test]
    async fn moving_a_unit_onto_its_own_slot_is_a_no_op() {
        let pool = test_util::memory_pool().await;
        test_util::seed_layout(&pool).await;
        let product_id = test_util::seed_product(&pool, "Pioneer", "P1197", None).await;
        let ids = ledger::receive(&pool, product_id, 1, None, None).await.unwrap();

        let top = slot_id(&pool, "C-R1-C1-T").await;
        move_unit(&pool, ids[0], top).await.unwrap();
        move_unit(&pool, ids[0], top).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_unit_and_unknown_location() {
        let pool = test_util::memory_pool().await;
        test_util::seed_layout(&pool).await;
        let product_id = test_util::seed_product(&pool, "Pioneer", "P1197", None).await;
        let ids = ledger::receive(&pool, product_id, 1, None, None).await.unwrap();

        let err = move_unit(&pool, ids[0], 123456).await.unwrap_err();
        assert!(matches!(err, InventoryError::NotFound { entity: "location", .. }));

        let top = slot_id(&pool, "C-R1-C1-T").await;
        let err = move_unit(&pool, 987654, top).await.unwrap_err();
        assert!(matches!(err, InventoryError::NotFound { entity: "inventory unit", .. }));
    }

    #[tokio::test]
    async fn units_can_return_to_the_pool() {
        let pool = test_util::memory_pool().await;
        test_util::seed_layout(&pool).await;
        let product_id = test_util::seed_product(&pool, "Pioneer", "P1197", None).await;
        let ids = ledger::receive(&pool, product_id, 2, None, None).await.unwrap();

        let top = slot_id(&pool, "C-R1-C1-T").await;
        move_unit(&pool, ids[0], top).await.unwrap();

        // The pool is unbounded: both units may sit there at once.
        move_unit(&pool, ids[0], granary_core::UNASSIGNED_LOCATION_ID)
            .await
            .unwrap();
        assert_eq!(ledger::list_unassigned(&pool).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn batch_move_reports_partial_failure_and_continues() {
        let pool = test_util::memory_pool().await;
        test_util::seed_layout(&pool).await;
        let product_id = test_util::seed_product(&pool, "Pioneer", "P1197", None).await;
        let ids = ledger::receive(&pool, product_id, 4, None, None).await.unwrap();

        let blocker = slot_id(&pool, "E-R2-C1-M").await;
        move_unit(&pool, ids[3], blocker).await.unwrap();

        let pairs = vec![
            (ids[0], slot_id(&pool, "C-R1-C1-T").await),
            (ids[1], blocker),
            (ids[2], slot_id(&pool, "C-R1-C1-B").await),
        ];
        let outcome = move_batch(&pool, &pairs).await.unwrap();

        assert_eq!(outcome.moved, 2);
        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].unit_id, ids[1]);
        assert!(outcome.errors[0].error.contains("occupied"));

        // first and third moves still applied
        assert_eq!(
            ledger::list_for_location(&pool, pairs[0].1).await.unwrap()[0].id,
            ids[0]
        );
        assert_eq!(
            ledger::list_for_location(&pool, pairs[2].1).await.unwrap()[0].id,
            ids[2]
        );
    }

    #[tokio::test]
    async fn shared_destination_batch_does_not_stack() {
        let pool = test_util::memory_pool().await;
        test_util::seed_layout(&pool).await;
        let product_id = test_util::seed_product(&pool, "Pioneer", "P1197", None).await;
        let ids = ledger::receive(&pool, product_id, 3, None, None).await.unwrap();

        let shared = slot_id(&pool, "W-R4-C2-T").await;
        let pairs: Vec<(i64, i64)> = ids.iter().map(|id| (*id, shared)).collect();
        let outcome = move_batch(&pool, &pairs).await.unwrap();

        assert_eq!(outcome.moved, 1);
        assert_eq!(outcome.errors.len(), 2);
        assert_eq!(ledger::list_for_location(&pool, shared).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_moves_to_one_slot_have_one_winner() {
        let pool = test_util::memory_pool().await;
        test_util::seed_layout(&pool).await;
        let product_id = test_util::seed_product(&pool, "Pioneer", "P1197", None).await;
        let ids = ledger::receive(&pool, product_id, 2, None, None).await.unwrap();

        let slot = slot_id(&pool, "C-R9-C3-M").await;
        let (first, second) = tokio::join!(
            move_unit(&pool, ids[0], slot),
            move_unit(&pool, ids[1], slot)
        );

        assert_eq!(
            [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
            1
        );
        let loser = if first.is_err() { first } else { second };
        assert!(matches!(
            loser.unwrap_err(),
            InventoryError::LocationOccupied { .. }
        ));
        assert_eq!(ledger::list_for_location(&pool, slot).await.unwrap().len(), 1);
    }
}
