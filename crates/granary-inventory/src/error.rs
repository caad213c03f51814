use std::fmt::Display;

use thiserror::Error;

/// Failures of ledger, placement, directory and catalog operations.
/// Validation errors are raised before any mutation.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("location {label} is already occupied")]
    LocationOccupied { label: String },

    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

impl InventoryError {
    pub fn invalid(message: impl Into<String>) -> Self {
        InventoryError::InvalidArgument(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        InventoryError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn occupied(label: impl Into<String>) -> Self {
        InventoryError::LocationOccupied {
            label: label.into(),
        }
    }
}

/// True when the underlying SQLite error is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub type InventoryResult<T> = Result<T, InventoryError>;
