pub mod dispatch;
pub mod error;
pub mod ledger;
pub mod locations;
pub mod placement;
pub mod products;

pub use error::{InventoryError, InventoryResult};
pub use ledger::UnitFilter;
pub use placement::{BatchOutcome, MoveFailure};
pub use products::ProductFilter;

#[cfg(test)]
pub(crate) mod test_util;
