//! SQLite storage backend for stockroom.
//!
//! This crate stores inventory items in a single `item` table and provides:
//!
//! - **`schema`**: embedded, versioned migration SQL with checksums
//! - **`migration`**: lifecycle operations (up/down/status)
//! - **`connection`**: opening, pinging, and migrating a database in one call
//! - **`repository`**: [`SqliteItemRepository`], the
//!   [`ItemRepository`](stockroom_core::ItemRepository) implementation
//!
//! # Quick start: migrations
//!
//! ```no_run
//! use stockroom_sqlite::Migration;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("stockroom.db").unwrap();
//! let mut migration = Migration::new(conn).unwrap();
//!
//! migration.up().unwrap();
//!
//! let status = migration.status().unwrap();
//! println!("Items: {:?}", status.item_count);
//! ```
//!
//! # Quick start: items
//!
//! ```no_run
//! use stockroom_core::ItemRepository;
//! use stockroom_sqlite::{DatabaseConfig, SqliteItemRepository};
//!
//! let repo = SqliteItemRepository::open(&DatabaseConfig::new("stockroom.db")).unwrap();
//! for item in repo.search_by_brand("apple").unwrap() {
//!     println!("{} x{}", item.sku, item.amount);
//! }
//! ```

mod connection;
mod error;
mod migration;
mod repository;
mod schema;

pub use connection::{
    DEFAULT_TIMEOUT, DatabaseConfig, IN_MEMORY, MAX_TIMEOUT, open_database, set_busy_timeout,
};
pub use error::{Result, SqliteError};
pub use migration::{AppliedMigration, Migration, MigrationStatus};
pub use repository::SqliteItemRepository;
pub use schema::{MIGRATIONS, MigrationStep, latest_version};
