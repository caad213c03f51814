//! The product catalog. Products are referenced by inventory units and are
//! never deleted while units point at them.

use chrono::Utc;
use granary_core::{Product, ProductSummary};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{InventoryError, InventoryResult, is_unique_violation};

/// Fields accepted by create and partial update.
#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub barcode: Option<String>,
    pub brand: Option<String>,
    pub product_code: Option<String>,
    pub seed_size: Option<String>,
    pub package_type: Option<String>,
    pub units_per_package: Option<i64>,
}

impl ProductInput {
    fn is_empty(&self) -> bool {
        self.barcode.is_none()
            && self.brand.is_none()
            && self.product_code.is_none()
            && self.seed_size.is_none()
            && self.package_type.is_none()
            && self.units_per_package.is_none()
    }
}

/// Optional catalog search filters: substring on brand/product_code, exact
/// on size and package.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub brand: Option<String>,
    pub product: Option<String>,
    pub size: Option<String>,
    pub package_type: Option<String>,
}

fn product_from_row(row: &SqliteRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: row.try_get("id")?,
        barcode: row.try_get("barcode")?,
        brand: row.try_get("brand")?,
        product_code: row.try_get("product_code")?,
        seed_size: row.try_get("seed_size")?,
        package_type: row.try_get("package_type")?,
        units_per_package: row.try_get("units_per_package")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Catalog search; every row carries its live unit count as `on_hand`.
pub async fn search(
    pool: &SqlitePool,
    filter: &ProductFilter,
) -> InventoryResult<Vec<ProductSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT
            p.id,
            p.barcode,
            p.brand,
            p.product_code,
            p.seed_size,
            p.package_type,
            p.units_per_package,
            p.created_at,
            p.updated_at,
            COUNT(i.id) AS on_hand
        FROM products p
        LEFT JOIN inventory i ON i.product_id = p.id
        WHERE (?1 IS NULL OR p.brand LIKE '%' || ?1 || '%')
          AND (?2 IS NULL OR p.product_code LIKE '%' || ?2 || '%')
          AND (?3 IS NULL OR p.seed_size = ?3)
          AND (?4 IS NULL OR p.package_type = ?4)
        GROUP BY p.id
        ORDER BY p.brand, p.product_code
        "#,
    )
    .bind(&filter.brand)
    .bind(&filter.product)
    .bind(&filter.size)
    .bind(&filter.package_type)
    .fetch_all(pool)
    .await?;

    let mut summaries = Vec::with_capacity(rows.len());
    for row in &rows {
        summaries.push(ProductSummary {
            id: row.try_get("id")?,
            barcode: row.try_get("barcode")?,
            brand: row.try_get("brand")?,
            product_code: row.try_get("product_code")?,
            seed_size: row.try_get("seed_size")?,
            package_type: row.try_get("package_type")?,
            units_per_package: row.try_get("units_per_package")?,
            on_hand: row.try_get("on_hand")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        });
    }
    Ok(summaries)
}

/// Exact barcode (GTIN) lookup, the resolver behind the scan workflow.
pub async fn get_by_barcode(pool: &SqlitePool, code: &str) -> InventoryResult<Product> {
    let row = sqlx::query(
        r#"
        SELECT id, barcode, brand, product_code, seed_size, package_type,
               units_per_package, created_at, updated_at
        FROM products
        WHERE barcode = ?1
        "#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| InventoryError::not_found("product", code))?;
    Ok(product_from_row(&row)?)
}

pub async fn create(pool: &SqlitePool, input: &ProductInput) -> InventoryResult<i64> {
    let brand = input.brand.as_deref().unwrap_or("").trim().to_string();
    let product_code = input.product_code.as_deref().unwrap_or("").trim().to_string();
    if brand.is_empty() || product_code.is_empty() {
        return Err(InventoryError::invalid(
            "brand and product_code are required",
        ));
    }

    let units_per_package = input.units_per_package.unwrap_or(1);
    if units_per_package < 1 {
        return Err(InventoryError::invalid(
            "units_per_package must be at least 1",
        ));
    }

    let barcode = normalized_barcode(input.barcode.as_deref());
    let now = Utc::now();

    let row = sqlx::query(
        r#"
        INSERT INTO products (barcode, brand, product_code, seed_size, package_type,
                              units_per_package, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        RETURNING id
        "#,
    )
    .bind(&barcode)
    .bind(&brand)
    .bind(&product_code)
    .bind(&input.seed_size)
    .bind(&input.package_type)
    .bind(units_per_package)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            InventoryError::invalid("barcode is already registered")
        } else {
            err.into()
        }
    })?;

    let id: i64 = row.try_get("id")?;
    debug!(id, brand, product_code, "product created");
    Ok(id)
}

/// Partial update: only provided fields change. Read-merge-write keeps the
/// statement static.
pub async fn update(pool: &SqlitePool, id: i64, input: &ProductInput) -> InventoryResult<()> {
    if input.is_empty() {
        return Err(InventoryError::invalid("no updatable fields provided"));
    }

    let row = sqlx::query(
        r#"
        SELECT id, barcode, brand, product_code, seed_size, package_type,
               units_per_package, created_at, updated_at
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| InventoryError::not_found("product", id))?;
    let existing = product_from_row(&row)?;

    let brand = input.brand.clone().unwrap_or(existing.brand);
    let product_code = input.product_code.clone().unwrap_or(existing.product_code);
    if brand.trim().is_empty() || product_code.trim().is_empty() {
        return Err(InventoryError::invalid(
            "brand and product_code must not be blank",
        ));
    }

    let units_per_package = input.units_per_package.unwrap_or(existing.units_per_package);
    if units_per_package < 1 {
        return Err(InventoryError::invalid(
            "units_per_package must be at least 1",
        ));
    }

    let barcode = match input.barcode.as_deref() {
        Some(code) => normalized_barcode(Some(code)),
        None => existing.barcode,
    };
    let seed_size = input.seed_size.clone().or(existing.seed_size);
    let package_type = input.package_type.clone().or(existing.package_type);

    sqlx::query(
        r#"
        UPDATE products
        SET barcode = ?2, brand = ?3, product_code = ?4, seed_size = ?5,
            package_type = ?6, units_per_package = ?7, updated_at = ?8
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(&barcode)
    .bind(brand.trim())
    .bind(product_code.trim())
    .bind(&seed_size)
    .bind(&package_type)
    .bind(units_per_package)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            InventoryError::invalid("barcode is already registered")
        } else {
            InventoryError::from(err)
        }
    })?;

    Ok(())
}

/// Removes a product with no remaining inventory.
pub async fn delete(pool: &SqlitePool, id: i64) -> InventoryResult<()> {
    let on_hand: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory WHERE product_id = ?1")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if on_hand > 0 {
        return Err(InventoryError::invalid(format!(
            "product still has {on_hand} units on hand"
        )));
    }

    let result = sqlx::query("DELETE FROM products WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(InventoryError::not_found("product", id));
    }
    Ok(())
}

fn normalized_barcode(code: Option<&str>) -> Option<String> {
    let trimmed = code.unwrap_or("").trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ledger, test_util};

    fn input(brand: &str, code: &str) -> ProductInput {
        ProductInput {
            brand: Some(brand.to_string()),
            product_code: Some(code.to_string()),
            ..ProductInput::default()
        }
    }

    #[tokio::test]
    async fn create_lookup_by_barcode() {
        let pool = test_util::memory_pool().await;
        let id = create(
            &pool,
            &ProductInput {
                barcode: Some("09506000134352".to_string()),
                units_per_package: Some(40),
                seed_size: Some("AF2".to_string()),
                ..input("Pioneer", "P1197AM")
            },
        )
        .await
        .unwrap();

        let product = get_by_barcode(&pool, "09506000134352").await.unwrap();
        assert_eq!(product.id, id);
        assert_eq!(product.units_per_package, 40);

        let err = get_by_barcode(&pool, "00000000000000").await.unwrap_err();
        assert!(matches!(err, InventoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn create_validates_required_fields() {
        let pool = test_util::memory_pool().await;

        let err = create(&pool, &input("", "P1197")).await.unwrap_err();
        assert!(matches!(err, InventoryError::InvalidArgument(_)));

        let err = create(
            &pool,
            &ProductInput {
                units_per_package: Some(0),
                ..input("Pioneer", "P1197")
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn duplicate_barcode_is_rejected() {
        let pool = test_util::memory_pool().await;
        create(
            &pool,
            &ProductInput {
                barcode: Some("09506000134352".to_string()),
                ..input("Pioneer", "P1197")
            },
        )
        .await
        .unwrap();

        let err = create(
            &pool,
            &ProductInput {
                barcode: Some("09506000134352".to_string()),
                ..input("Dekalb", "DKC62")
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn search_counts_on_hand_units() {
        let pool = test_util::memory_pool().await;
        let pioneer = create(&pool, &input("Pioneer", "P1197AM")).await.unwrap();
        create(&pool, &input("Dekalb", "DKC62-89")).await.unwrap();
        ledger::receive(&pool, pioneer, 3, None, None).await.unwrap();

        let all = search(&pool, &ProductFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        let by_id = |id: i64| all.iter().find(|p| p.id == id).unwrap();
        assert_eq!(by_id(pioneer).on_hand, 3);

        let hits = search(
            &pool,
            &ProductFilter {
                brand: Some("pio".to_string()),
                ..ProductFilter::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].on_hand, 3);
    }

    #[tokio::test]
    async fn partial_update_touches_only_given_fields() {
        let pool = test_util::memory_pool().await;
        let id = create(
            &pool,
            &ProductInput {
                seed_size: Some("AF2".to_string()),
                ..input("Pioneer", "P1197AM")
            },
        )
        .await
        .unwrap();

        update(
            &pool,
            id,
            &ProductInput {
                package_type: Some("Box".to_string()),
                ..ProductInput::default()
            },
        )
        .await
        .unwrap();

        let all = search(&pool, &ProductFilter::default()).await.unwrap();
        assert_eq!(all[0].brand, "Pioneer");
        assert_eq!(all[0].seed_size.as_deref(), Some("AF2"));
        assert_eq!(all[0].package_type.as_deref(), Some("Box"));

        let err = update(&pool, id, &ProductInput::default()).await.unwrap_err();
        assert!(matches!(err, InventoryError::InvalidArgument(_)));

        let err = update(&pool, 777, &input("X", "Y")).await.unwrap_err();
        assert!(matches!(err, InventoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_refused_while_units_remain() {
        let pool = test_util::memory_pool().await;
        let id = create(&pool, &input("Pioneer", "P1197")).await.unwrap();
        let units = ledger::receive(&pool, id, 1, None, None).await.unwrap();

        let err = delete(&pool, id).await.unwrap_err();
        assert!(matches!(err, InventoryError::InvalidArgument(_)));

        ledger::delete_unit(&pool, units[0]).await.unwrap();
        delete(&pool, id).await.unwrap();

        let err = delete(&pool, id).await.unwrap_err();
        assert!(matches!(err, InventoryError::NotFound { .. }));
    }
}
