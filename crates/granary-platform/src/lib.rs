pub mod config;
pub mod contracts;
pub mod db;
pub mod schema;

pub use config::ServiceConfig;
pub use contracts::{
    BatchMoveError, BatchMoveResponse, CreateLocationRequest, DispatchRequest, DispatchResponse,
    GenerateLayoutResponse, IdResponse, InventorySearchQuery, MoveRequest, MoveResponse,
    OutboundQuery, ProductPayload, ProductSearchQuery, ReceiveRequest, ReceiveResponse,
    ScanReceiveRequest, ScanReceiveResponse, StageRequest, StageResponse, UnstageRequest,
    UnstageResponse,
};
pub use db::connect_database;
pub use schema::init_schema;
