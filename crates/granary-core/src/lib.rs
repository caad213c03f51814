pub mod barcode;
pub mod layout;
pub mod models;

pub use barcode::{ScanPayload, parse_scan};
pub use layout::{SlotSpec, TIERS, ZoneBlock, default_blocks, generate_layout};
pub use models::{
    Location, OutboundEntry, Product, ProductSummary, UNASSIGNED_LOCATION_ID, UnitView,
};
