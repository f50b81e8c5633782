//! Core inventory types and the storage contract.
//!
//! This crate defines the pieces every other stockroom crate agrees on:
//!
//! - [`Item`] and [`NewItem`]: one inventory record, with and without its
//!   storage-assigned id.
//! - [`FieldSpec`] and [`ITEM_FIELDS`]: the ordered prompt descriptors
//!   (`label`, `required`, `kind`) that drive interactive input.
//! - [`format_item`]: the one-line, presentation-cased rendering of an item.
//! - [`ItemRepository`]: the CRUD capability set a storage backend provides,
//!   along with the [`RepositoryError`] taxonomy it reports.
//!
//! # Example
//!
//! ```
//! use stockroom_core::*;
//!
//! let item = NewItem::new("iphone 12 pro", "apple", "aap12p21", "phone", "storage room", 2)
//!     .into_item(1);
//!
//! assert_eq!(
//!     format_item(&item),
//!     "[AAP12P21] Name: Iphone 12 Pro | Brand: Apple | Category: Phone | location: STORAGE ROOM | Stock: 2"
//! );
//! assert_eq!(ITEM_FIELDS[2].field, Field::Sku);
//! ```

mod format;
mod repository;
mod types;

pub use format::{format_item, title_case};
pub use repository::{DeadlineExceeded, ItemRepository, RepositoryError, StorageError};
pub use types::*;
