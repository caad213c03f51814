use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiveRequest {
    pub product_id: Option<i64>,
    pub qty: Option<i64>,
    pub owner: Option<String>,
    pub lot: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiveResponse {
    pub message: String,
    pub qty_inserted: i64,
    pub product_id: i64,
    pub location_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReceiveRequest {
    pub barcode: Option<String>,
    pub qty: Option<i64>,
    pub owner: Option<String>,
    pub lot: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReceiveResponse {
    pub message: String,
    pub qty_inserted: i64,
    pub product_id: i64,
    pub location_id: i64,
    pub gtin: String,
    pub lot: Option<String>,
}

/// The move endpoint accepts three shapes: a single unit, explicit
/// unit/destination pairs, or all units to one shared destination. Older
/// map clients post `ids`, kept as an alias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub inventory_id: Option<i64>,
    pub location_id: Option<i64>,
    #[serde(alias = "ids")]
    pub inventory_ids: Option<Vec<i64>>,
    pub location_ids: Option<Vec<i64>>,
    pub to_location_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveResponse {
    pub message: String,
    pub inventory_id: i64,
    pub location_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMoveError {
    pub unit_id: i64,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMoveResponse {
    pub message: String,
    pub moved: i64,
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_location_id: Option<i64>,
    pub errors: Vec<BatchMoveError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRequest {
    #[serde(default, alias = "ids")]
    pub inventory_ids: Vec<i64>,
    pub customer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResponse {
    pub message: String,
    pub staged_count: i64,
    pub customer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnstageRequest {
    #[serde(default, alias = "ids")]
    pub inventory_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnstageResponse {
    pub message: String,
    pub unstaged_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySearchQuery {
    pub brand: Option<String>,
    pub product: Option<String>,
    pub size: Option<String>,
    pub package_type: Option<String>,
    pub lot: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    #[serde(default, alias = "ids")]
    pub inventory_ids: Vec<i64>,
    pub dispatched_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub message: String,
    pub dispatched_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLocationRequest {
    pub label: Option<String>,
    pub zone: Option<String>,
    pub row_index: Option<i64>,
    pub col_index: Option<i64>,
    pub tier: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateLayoutResponse {
    pub message: String,
    pub total_locations: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSearchQuery {
    pub brand: Option<String>,
    pub product: Option<String>,
    pub size: Option<String>,
    pub package_type: Option<String>,
}

/// Product fields for create (POST) and partial update (PUT). On update,
/// only provided fields change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPayload {
    pub barcode: Option<String>,
    pub brand: Option<String>,
    pub product_code: Option<String>,
    pub seed_size: Option<String>,
    pub package_type: Option<String>,
    pub units_per_package: Option<i64>,
}

/// Generic `{message, id}` acknowledgement for create/delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdResponse {
    pub message: String,
    pub id: i64,
}
