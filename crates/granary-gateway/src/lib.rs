//! The REST surface of the warehouse tracker. Handlers stay thin: normalize
//! the request, call into `granary-inventory`, map the error taxonomy onto
//! HTTP. Every failure body is `{"error": "<description>"}`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use granary_core::{
    Location, OutboundEntry, Product, ProductSummary, UNASSIGNED_LOCATION_ID, UnitView, parse_scan,
};
use granary_inventory::products::ProductInput;
use granary_inventory::{
    InventoryError, ProductFilter, UnitFilter, dispatch, ledger, locations, placement, products,
};
use granary_platform::contracts::{
    BatchMoveError, BatchMoveResponse, CreateLocationRequest, DispatchRequest, DispatchResponse,
    GenerateLayoutResponse, IdResponse, InventorySearchQuery, MoveRequest, MoveResponse,
    OutboundQuery, ProductPayload, ProductSearchQuery, ReceiveRequest, ReceiveResponse,
    ScanReceiveRequest, ScanReceiveResponse, StageRequest, StageResponse, UnstageRequest,
    UnstageResponse,
};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/inventory", get(list_inventory))
        .route("/inventory/receive", post(receive_inventory))
        .route(
            "/inventory/unassigned",
            get(list_unassigned).post(receive_inventory),
        )
        .route("/inventory/receive-scan", post(receive_scan))
        .route("/inventory/move", post(move_inventory))
        .route("/inventory/stage", post(stage_inventory))
        .route("/inventory/unstage", post(unstage_inventory))
        .route("/inventory/search", get(search_inventory))
        .route("/inventory/dispatch", post(dispatch_inventory))
        .route("/inventory/location/{id}", get(inventory_for_location))
        .route("/inventory/product/{id}", get(inventory_for_product))
        .route("/inventory/{id}", delete(delete_inventory))
        .route("/outbound-log", get(list_outbound))
        .route("/locations", get(list_locations).post(create_location))
        .route("/locations/zone/{zone}", get(locations_by_zone))
        .route("/locations/by-label/{label}", get(location_by_label))
        .route("/locations/generate-all", post(generate_locations))
        .route("/locations/{id}", delete(delete_location))
        .route("/products", get(search_products).post(create_product))
        .route("/products/barcode/{code}", get(product_by_barcode))
        .route("/products/{id}", put(update_product).delete(delete_product))
        .with_state(state)
}

type ApiError = (StatusCode, Json<Value>);

fn error_body(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "error": message.into() }))
}

fn invalid_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, error_body(message))
}

fn error_response(err: InventoryError) -> ApiError {
    match &err {
        InventoryError::InvalidArgument(_) | InventoryError::LocationOccupied { .. } => {
            (StatusCode::BAD_REQUEST, error_body(err.to_string()))
        }
        InventoryError::NotFound { .. } => (StatusCode::NOT_FOUND, error_body(err.to_string())),
        InventoryError::Storage(source) => {
            error!("storage error: {source}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("internal storage error"),
            )
        }
    }
}

/// Empty and whitespace-only query/body strings count as absent.
fn text_or_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn receive_inventory(
    State(state): State<AppState>,
    Json(payload): Json<ReceiveRequest>,
) -> Result<Json<ReceiveResponse>, ApiError> {
    let product_id = payload
        .product_id
        .ok_or_else(|| invalid_request("product_id is required"))?;
    let qty = payload
        .qty
        .ok_or_else(|| invalid_request("qty is required"))?;
    let owner = text_or_none(payload.owner);
    let lot = text_or_none(payload.lot);

    let ids = ledger::receive(&state.pool, product_id, qty, owner.as_deref(), lot.as_deref())
        .await
        .map_err(error_response)?;

    Ok(Json(ReceiveResponse {
        message: "Inventory received".to_string(),
        qty_inserted: ids.len() as i64,
        product_id,
        location_id: UNASSIGNED_LOCATION_ID,
    }))
}

/// Barcode-driven receiving: decode the scan, resolve the product by GTIN,
/// then receive into the pool. A lot in the request wins over the scanned one.
async fn receive_scan(
    State(state): State<AppState>,
    Json(payload): Json<ScanReceiveRequest>,
) -> Result<Json<ScanReceiveResponse>, ApiError> {
    let barcode = text_or_none(payload.barcode)
        .ok_or_else(|| invalid_request("barcode is required"))?;
    let qty = payload.qty.unwrap_or(1);

    let scan = parse_scan(&barcode);
    let gtin = scan
        .gtin
        .ok_or_else(|| invalid_request("barcode does not contain a GTIN"))?;

    let product = products::get_by_barcode(&state.pool, &gtin)
        .await
        .map_err(error_response)?;

    let owner = text_or_none(payload.owner);
    let lot = text_or_none(payload.lot).or(scan.lot);

    let ids = ledger::receive(&state.pool, product.id, qty, owner.as_deref(), lot.as_deref())
        .await
        .map_err(error_response)?;

    Ok(Json(ScanReceiveResponse {
        message: "Inventory received".to_string(),
        qty_inserted: ids.len() as i64,
        product_id: product.id,
        location_id: UNASSIGNED_LOCATION_ID,
        gtin,
        lot,
    }))
}

async fn list_inventory(
    State(state): State<AppState>,
) -> Result<Json<Vec<UnitView>>, ApiError> {
    let units = ledger::list_all(&state.pool).await.map_err(error_response)?;
    Ok(Json(units))
}

async fn list_unassigned(
    State(state): State<AppState>,
) -> Result<Json<Vec<UnitView>>, ApiError> {
    let units = ledger::list_unassigned(&state.pool)
        .await
        .map_err(error_response)?;
    Ok(Json(units))
}

async fn inventory_for_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<UnitView>>, ApiError> {
    let units = ledger::list_for_location(&state.pool, id)
        .await
        .map_err(error_response)?;
    Ok(Json(units))
}

async fn inventory_for_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<UnitView>>, ApiError> {
    let units = ledger::list_for_product(&state.pool, id)
        .await
        .map_err(error_response)?;
    Ok(Json(units))
}

async fn search_inventory(
    State(state): State<AppState>,
    Query(query): Query<InventorySearchQuery>,
) -> Result<Json<Vec<UnitView>>, ApiError> {
    let filter = UnitFilter {
        brand: text_or_none(query.brand),
        product: text_or_none(query.product),
        size: text_or_none(query.size),
        package_type: text_or_none(query.package_type),
        lot: text_or_none(query.lot),
    };
    let units = ledger::search(&state.pool, &filter)
        .await
        .map_err(error_response)?;
    Ok(Json(units))
}

/// One endpoint, three shapes: a single unit, explicit unit/destination
/// pairs, or every unit to one shared destination (the no-stacking rule
/// still applies there, so at most one unit lands in a non-pool slot).
async fn move_inventory(
    State(state): State<AppState>,
    Json(payload): Json<MoveRequest>,
) -> Result<Response, ApiError> {
    if let Some(unit_ids) = payload.inventory_ids {
        if unit_ids.is_empty() {
            return Err(invalid_request("inventory_ids must not be empty"));
        }

        let (pairs, shared_destination) = if let Some(location_ids) = payload.location_ids {
            if location_ids.len() != unit_ids.len() {
                return Err(invalid_request(
                    "inventory_ids and location_ids must have the same length",
                ));
            }
            let pairs: Vec<(i64, i64)> =
                unit_ids.into_iter().zip(location_ids.into_iter()).collect();
            (pairs, None)
        } else {
            let destination = payload
                .to_location_id
                .or(payload.location_id)
                .ok_or_else(|| invalid_request("to_location_id is required for a batch move"))?;
            let pairs: Vec<(i64, i64)> =
                unit_ids.into_iter().map(|id| (id, destination)).collect();
            (pairs, Some(destination))
        };

        let outcome = placement::move_batch(&state.pool, &pairs)
            .await
            .map_err(error_response)?;

        let response = BatchMoveResponse {
            message: "Batch move finished".to_string(),
            moved: outcome.moved,
            total: outcome.total,
            to_location_id: shared_destination,
            errors: outcome
                .errors
                .into_iter()
                .map(|failure| BatchMoveError {
                    unit_id: failure.unit_id,
                    error: failure.error,
                })
                .collect(),
        };
        return Ok(Json(response).into_response());
    }

    let inventory_id = payload
        .inventory_id
        .ok_or_else(|| invalid_request("inventory_id is required"))?;
    let location_id = payload
        .location_id
        .ok_or_else(|| invalid_request("location_id is required"))?;

    placement::move_unit(&state.pool, inventory_id, location_id)
        .await
        .map_err(error_response)?;

    Ok(Json(MoveResponse {
        message: "Inventory moved".to_string(),
        inventory_id,
        location_id,
    })
    .into_response())
}

async fn stage_inventory(
    State(state): State<AppState>,
    Json(payload): Json<StageRequest>,
) -> Result<Json<StageResponse>, ApiError> {
    let customer = payload.customer.unwrap_or_default();
    let staged = ledger::stage(&state.pool, &payload.inventory_ids, &customer)
        .await
        .map_err(error_response)?;

    Ok(Json(StageResponse {
        message: "Inventory staged".to_string(),
        staged_count: staged,
        customer: customer.trim().to_string(),
    }))
}

async fn unstage_inventory(
    State(state): State<AppState>,
    Json(payload): Json<UnstageRequest>,
) -> Result<Json<UnstageResponse>, ApiError> {
    let unstaged = ledger::unstage(&state.pool, &payload.inventory_ids)
        .await
        .map_err(error_response)?;

    Ok(Json(UnstageResponse {
        message: "Inventory unstaged".to_string(),
        unstaged_count: unstaged,
    }))
}

async fn delete_inventory(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<IdResponse>, ApiError> {
    ledger::delete_unit(&state.pool, id)
        .await
        .map_err(error_response)?;
    Ok(Json(IdResponse {
        message: "Inventory removed".to_string(),
        id,
    }))
}

async fn dispatch_inventory(
    State(state): State<AppState>,
    Json(payload): Json<DispatchRequest>,
) -> Result<Json<DispatchResponse>, ApiError> {
    let dispatched_by = payload.dispatched_by.unwrap_or_default();
    let dispatched = dispatch::dispatch(&state.pool, &payload.inventory_ids, &dispatched_by)
        .await
        .map_err(error_response)?;

    Ok(Json(DispatchResponse {
        message: "Inventory dispatched".to_string(),
        dispatched_count: dispatched,
    }))
}

async fn list_outbound(
    State(state): State<AppState>,
    Query(query): Query<OutboundQuery>,
) -> Result<Json<Vec<OutboundEntry>>, ApiError> {
    let entries = dispatch::list_outbound(&state.pool, query.limit)
        .await
        .map_err(error_response)?;
    Ok(Json(entries))
}

async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Location>>, ApiError> {
    let rows = locations::list_all(&state.pool)
        .await
        .map_err(error_response)?;
    Ok(Json(rows))
}

async fn locations_by_zone(
    State(state): State<AppState>,
    Path(zone): Path<String>,
) -> Result<Json<Vec<Location>>, ApiError> {
    let rows = locations::list_by_zone(&state.pool, &zone)
        .await
        .map_err(error_response)?;
    Ok(Json(rows))
}

async fn location_by_label(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> Result<Json<Location>, ApiError> {
    let location = locations::get_by_label(&state.pool, &label)
        .await
        .map_err(error_response)?;
    Ok(Json(location))
}

async fn create_location(
    State(state): State<AppState>,
    Json(payload): Json<CreateLocationRequest>,
) -> Result<Json<IdResponse>, ApiError> {
    let (label, zone, row_index, col_index) = match (
        text_or_none(payload.label),
        text_or_none(payload.zone),
        payload.row_index,
        payload.col_index,
    ) {
        (Some(label), Some(zone), Some(row_index), Some(col_index)) => {
            (label, zone, row_index, col_index)
        }
        _ => {
            return Err(invalid_request(
                "label, zone, row_index, and col_index are required",
            ));
        }
    };

    let id = locations::create(
        &state.pool,
        &label,
        &zone,
        row_index,
        col_index,
        payload.tier.as_deref(),
    )
    .await
    .map_err(error_response)?;

    Ok(Json(IdResponse {
        message: "Location added".to_string(),
        id,
    }))
}

async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<IdResponse>, ApiError> {
    locations::delete(&state.pool, id)
        .await
        .map_err(error_response)?;
    Ok(Json(IdResponse {
        message: "Location deleted".to_string(),
        id,
    }))
}

/// Destructive: wipes and regenerates the fixed floor plan.
async fn generate_locations(
    State(state): State<AppState>,
) -> Result<Json<GenerateLayoutResponse>, ApiError> {
    let total = locations::regenerate(&state.pool)
        .await
        .map_err(error_response)?;
    Ok(Json(GenerateLayoutResponse {
        message: "All warehouse blocks generated.".to_string(),
        total_locations: total,
    }))
}

async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<ProductSearchQuery>,
) -> Result<Json<Vec<ProductSummary>>, ApiError> {
    let filter = ProductFilter {
        brand: text_or_none(query.brand),
        product: text_or_none(query.product),
        size: text_or_none(query.size),
        package_type: text_or_none(query.package_type),
    };
    let rows = products::search(&state.pool, &filter)
        .await
        .map_err(error_response)?;
    Ok(Json(rows))
}

async fn product_by_barcode(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = products::get_by_barcode(&state.pool, &code)
        .await
        .map_err(error_response)?;
    Ok(Json(product))
}

fn product_input(payload: ProductPayload) -> ProductInput {
    ProductInput {
        barcode: payload.barcode,
        brand: payload.brand,
        product_code: payload.product_code,
        seed_size: payload.seed_size,
        package_type: payload.package_type,
        units_per_package: payload.units_per_package,
    }
}

async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<IdResponse>, ApiError> {
    let id = products::create(&state.pool, &product_input(payload))
        .await
        .map_err(error_response)?;
    Ok(Json(IdResponse {
        message: "Product added".to_string(),
        id,
    }))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<IdResponse>, ApiError> {
    products::update(&state.pool, id, &product_input(payload))
        .await
        .map_err(error_response)?;
    Ok(Json(IdResponse {
        message: "Product updated".to_string(),
        id,
    }))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<IdResponse>, ApiError> {
    products::delete(&state.pool, id)
        .await
        .map_err(error_response)?;
    Ok(Json(IdResponse {
        message: "Product deleted".to_string(),
        id,
    }))
}
