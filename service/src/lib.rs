//! Interactive inventory operations for stockroom.
//!
//! The crate sits between a command-line front end and an
//! [`ItemRepository`](stockroom_core::ItemRepository):
//!
//! - [`Prompter`] reads one normalized value per field, re-asking for blank
//!   required fields within a [`PromptPolicy`] budget.
//! - [`InventoryService`] runs one operation per call (create, search,
//!   adjust, update, delete) and writes formatted results to its own output
//!   stream, apart from the prompts.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use stockroom_service::{InventoryService, Prompter};
//! use stockroom_sqlite::{DatabaseConfig, IN_MEMORY, SqliteItemRepository};
//!
//! let repo = SqliteItemRepository::open(&DatabaseConfig::new(IN_MEMORY)).unwrap();
//! let input = "iphone 12 pro\napple\naap12p21\nphone\nstorage room\n2\n";
//! let prompter = Prompter::new(Cursor::new(input), Vec::new());
//! let mut service = InventoryService::new(repo, prompter, Vec::new());
//!
//! let item = service.create().unwrap();
//! assert_eq!(item.sku, "aap12p21");
//! ```

mod error;
mod prompt;
mod service;

pub use error::{Result, ServiceError, ValidationError};
pub use prompt::{PromptPolicy, Prompter};
pub use service::{Adjustment, InventoryService, OutputMode, SearchBy};
