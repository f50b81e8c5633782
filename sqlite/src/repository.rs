//! SQLite implementation of [`ItemRepository`].
//!
//! Every call runs under a deadline. A progress handler interrupts the
//! statement once the deadline has passed and the busy timeout set on the
//! connection bounds lock waits; either way the caller receives a
//! [`StorageError`] instead of blocking.
//!
//! # Example
//!
//! ```
//! use stockroom_core::{ItemRepository, NewItem};
//! use stockroom_sqlite::{DatabaseConfig, IN_MEMORY, SqliteItemRepository};
//!
//! let config = DatabaseConfig::new(IN_MEMORY);
//! let mut repo = SqliteItemRepository::open(&config).unwrap();
//!
//! let stored = repo
//!     .create(&NewItem::new("iphone 12 pro", "apple", "aap12p21", "phone", "storage room", 2))
//!     .unwrap();
//! assert_eq!(repo.search_by_sku("aap12p21").unwrap(), Some(stored));
//! ```

use std::time::{Duration, Instant};

use rusqlite::{Connection, ErrorCode, Row, ffi, params};
use stockroom_core::{
    DeadlineExceeded, Field, Item, ItemRepository, NewItem, RepositoryError, StorageError,
};
use tracing::debug;

use crate::connection::{DatabaseConfig, open_database, set_busy_timeout};

/// Columns selected for every item query, in [`row_to_item`] order.
const ITEM_COLUMNS: &str = "id, name, brand, sku, category, location, amount";

/// SQLite virtual machine steps between deadline checks.
const PROGRESS_STEPS: i32 = 1_000;

/// Item storage backed by a single SQLite connection.
pub struct SqliteItemRepository {
    conn: Connection,
    timeout: Duration,
}

impl SqliteItemRepository {
    /// Wraps a connected, migrated handle and sets its busy timeout to
    /// `timeout`, so lock waits share the per-call budget.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::ConnectionError`](crate::SqliteError::ConnectionError)
    /// if `timeout` exceeds [`MAX_TIMEOUT`](crate::MAX_TIMEOUT).
    pub fn new(conn: Connection, timeout: Duration) -> crate::Result<Self> {
        set_busy_timeout(&conn, timeout)?;
        Ok(Self { conn, timeout })
    }

    /// Opens the configured database with [`open_database`] and wraps it.
    pub fn open(config: &DatabaseConfig) -> crate::Result<Self> {
        let conn = open_database(config)?;
        Self::new(conn, config.timeout)
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs `op` with the deadline guard installed and classifies its error.
    ///
    /// `sku` names the value a unique violation would be reported against.
    fn guarded<T>(
        &self,
        context: &str,
        sku: Option<&str>,
        op: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, RepositoryError> {
        if let Some(deadline) = Instant::now().checked_add(self.timeout) {
            self.conn
                .progress_handler(PROGRESS_STEPS, Some(move || Instant::now() >= deadline));
        }
        let result = op(&self.conn);
        self.conn.progress_handler(0, None::<fn() -> bool>);
        result.map_err(|err| classify(context, sku, self.timeout, err))
    }

    fn search_by_column(&self, field: Field, value: &str) -> Result<Vec<Item>, RepositoryError> {
        debug!(column = field.column(), value, "searching items");
        let context = format!("search items by {field}");
        self.guarded(&context, None, |conn| {
            // The column name comes from the closed `Field` set, never from input.
            let mut stmt = conn.prepare(&format!(
                "SELECT {ITEM_COLUMNS} FROM item WHERE {} = ?1 ORDER BY id",
                field.column()
            ))?;
            let items = stmt
                .query_map(params![value], row_to_item)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(items)
        })
    }
}

impl ItemRepository for SqliteItemRepository {
    fn create(&mut self, item: &NewItem) -> Result<Item, RepositoryError> {
        debug!(sku = %item.sku, "inserting item");
        let id = self.guarded("insert item", Some(item.sku.as_str()), |conn| {
            conn.execute(
                "INSERT INTO item (name, brand, sku, category, location, amount) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    item.name,
                    item.brand,
                    item.sku,
                    item.category,
                    item.location,
                    item.amount
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;
        Ok(item.clone().into_item(id))
    }

    fn search_by_name(&self, name: &str) -> Result<Vec<Item>, RepositoryError> {
        self.search_by_column(Field::Name, name)
    }

    fn search_by_brand(&self, brand: &str) -> Result<Vec<Item>, RepositoryError> {
        self.search_by_column(Field::Brand, brand)
    }

    fn search_by_category(&self, category: &str) -> Result<Vec<Item>, RepositoryError> {
        self.search_by_column(Field::Category, category)
    }

    fn search_by_sku(&self, sku: &str) -> Result<Option<Item>, RepositoryError> {
        debug!(sku, "looking up item");
        self.guarded("search item by sku", None, |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ITEM_COLUMNS} FROM item WHERE sku = ?1"
            ))?;
            let mut rows = stmt.query(params![sku])?;
            let item = rows.next()?.map(row_to_item).transpose()?;
            Ok(item)
        })
    }

    fn update(&mut self, item: &Item) -> Result<(), RepositoryError> {
        debug!(id = item.id, sku = %item.sku, "updating item");
        let rows = self.guarded("update item", Some(item.sku.as_str()), |conn| {
            conn.execute(
                "UPDATE item SET name = ?1, brand = ?2, sku = ?3, category = ?4, \
                 location = ?5, amount = ?6 WHERE id = ?7",
                params![
                    item.name,
                    item.brand,
                    item.sku,
                    item.category,
                    item.location,
                    item.amount,
                    item.id
                ],
            )
        })?;
        if rows == 0 {
            debug!(id = item.id, "update matched no rows");
        }
        Ok(())
    }

    fn delete(&mut self, sku: &str) -> Result<usize, RepositoryError> {
        let rows = self.guarded("delete item", None, |conn| {
            conn.execute("DELETE FROM item WHERE sku = ?1", params![sku])
        })?;
        debug!(sku, rows, "deleted items");
        Ok(rows)
    }
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        brand: row.get(2)?,
        sku: row.get(3)?,
        category: row.get(4)?,
        location: row.get(5)?,
        amount: row.get(6)?,
    })
}

/// Maps a driver error onto the repository taxonomy.
fn classify(
    context: &str,
    sku: Option<&str>,
    timeout: Duration,
    err: rusqlite::Error,
) -> RepositoryError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
            && let Some(sku) = sku
        {
            return RepositoryError::DuplicateSku(sku.to_string());
        }
        // Busy errors only surface after the connection's busy timeout, which
        // `new` sets to the same budget.
        if matches!(
            failure.code,
            ErrorCode::OperationInterrupted | ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
        ) {
            return StorageError::new(context, DeadlineExceeded { timeout }).into();
        }
    }
    StorageError::new(context, err).into()
}
