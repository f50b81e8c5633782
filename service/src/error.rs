//! Error types for prompting and inventory operations.

use stockroom_core::{ItemError, RepositoryError, StorageError};
use thiserror::Error;

/// Errors raised while reading a field from the operator.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field was left blank on every allowed attempt.
    #[error("invalid input data for '{field}': exceeded {attempts} allowed attempts")]
    InputExhausted { field: String, attempts: u32 },

    /// A numeric field received text that is not an integer.
    #[error("'{value}' is not a whole number (field '{field}')")]
    InvalidNumber { field: String, value: String },

    /// The input stream ended before a value was entered.
    #[error("input closed while reading '{field}'")]
    InputClosed { field: String },

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by [`InventoryService`](crate::InventoryService) operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another item already uses the SKU.
    #[error("SKU code [{0}] already in use")]
    DuplicateSku(String),

    /// No item has the SKU.
    #[error("no item found with SKU [{0}]")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[source] StorageError),

    /// Adding to or subtracting from the stock count left the `i64` range.
    #[error("stock adjustment for [{sku}] is out of range")]
    AmountOverflow { sku: String },

    /// A prompted value could not be applied to the item.
    #[error(transparent)]
    InvalidField(#[from] ItemError),

    /// Writing results to the output stream failed.
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateSku(sku) => ServiceError::DuplicateSku(sku),
            RepositoryError::Storage(e) => ServiceError::Storage(e),
        }
    }
}

impl ServiceError {
    /// Returns `true` if the failure was a storage call running past its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ServiceError::Storage(e) if e.is_timeout())
    }
}

/// Convenience result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
