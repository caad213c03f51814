use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved pseudo-location holding received-but-not-placed stock.
/// Exempt from the one-unit-per-slot rule.
pub const UNASSIGNED_LOCATION_ID: i64 = 9999;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub barcode: Option<String>,
    pub brand: String,
    pub product_code: String,
    pub seed_size: Option<String>,
    pub package_type: Option<String>,
    pub units_per_package: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product row as returned by catalog search, with its live unit count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: i64,
    pub barcode: Option<String>,
    pub brand: String,
    pub product_code: String,
    pub seed_size: Option<String>,
    pub package_type: Option<String>,
    pub units_per_package: i64,
    pub on_hand: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub label: String,
    pub zone: String,
    pub row_index: i64,
    pub col_index: i64,
    pub tier: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One discrete physical inventory unit joined with the product and location
/// display fields the list/search endpoints return. A unit is one physical
/// item: receiving N units inserts N rows, there is deliberately no quantity
/// column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitView {
    pub id: i64,
    pub product_id: i64,
    pub location_id: i64,
    pub lot: Option<String>,
    pub owner: Option<String>,
    pub staged: bool,
    pub brand: String,
    pub product_code: String,
    pub seed_size: Option<String>,
    pub package_type: Option<String>,
    pub units_per_package: i64,
    pub barcode: Option<String>,
    pub location_label: String,
    pub zone: String,
}

/// Append-only snapshot written when a staged unit leaves the warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundEntry {
    pub id: String,
    pub inventory_id: i64,
    pub product_id: i64,
    pub brand: String,
    pub product_code: String,
    pub lot: Option<String>,
    pub owner: Option<String>,
    pub location_label: String,
    pub dispatched_by: String,
    pub dispatched_at: DateTime<Utc>,
}
