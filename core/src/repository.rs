//! The storage contract for inventory items.
//!
//! [`ItemRepository`] is the seam between the inventory service and a
//! storage engine. The SQLite backend implements it for production use and
//! tests substitute an in-memory store.

use std::error::Error as StdError;
use std::time::Duration;

use thiserror::Error;

use crate::types::{Item, NewItem};

/// Errors reported by an [`ItemRepository`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The unique constraint on `sku` rejected the write.
    #[error("SKU code [{0}] already in use")]
    DuplicateSku(String),

    /// Any other storage failure, including deadline expiry.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A storage failure with the operation it interrupted.
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct StorageError {
    context: String,
    #[source]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

impl StorageError {
    pub fn new(
        context: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Short description of the operation that failed.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Returns `true` if the operation ran past its deadline.
    pub fn is_timeout(&self) -> bool {
        self.source.downcast_ref::<DeadlineExceeded>().is_some()
    }
}

/// The storage call did not finish within its time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {timeout:?} exceeded")]
pub struct DeadlineExceeded {
    pub timeout: Duration,
}

/// CRUD capability set over stored [`Item`]s.
///
/// All lookups are exact matches on the stored value, so callers pass the
/// same normalized text that was stored.
pub trait ItemRepository {
    /// Inserts a new item and returns it with its storage-assigned id.
    ///
    /// # Errors
    ///
    /// MUST return [`RepositoryError::DuplicateSku`] if another item already
    /// uses the SKU.
    fn create(&mut self, item: &NewItem) -> Result<Item, RepositoryError>;

    /// Items whose name equals `name`, ordered by id. Empty when none match.
    fn search_by_name(&self, name: &str) -> Result<Vec<Item>, RepositoryError>;

    /// Items whose brand equals `brand`, ordered by id. Empty when none match.
    fn search_by_brand(&self, brand: &str) -> Result<Vec<Item>, RepositoryError>;

    /// Items whose category equals `category`, ordered by id. Empty when none match.
    fn search_by_category(&self, category: &str) -> Result<Vec<Item>, RepositoryError>;

    /// The item with the given SKU, or `None`.
    fn search_by_sku(&self, sku: &str) -> Result<Option<Item>, RepositoryError>;

    /// Overwrites every editable field of the row identified by `item.id`.
    ///
    /// The SKU is an ordinary field here and may change.
    ///
    /// # Errors
    ///
    /// MUST return [`RepositoryError::DuplicateSku`] if the new SKU belongs
    /// to another item.
    fn update(&mut self, item: &Item) -> Result<(), RepositoryError>;

    /// Removes the item with the given SKU and returns the number of rows
    /// removed. Removing an unknown SKU is not an error.
    fn delete(&mut self, sku: &str) -> Result<usize, RepositoryError>;
}
