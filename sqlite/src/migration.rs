//! Migration lifecycle operations for the inventory schema.
//!
//! Provides [`Migration`] for bringing the database up to the latest
//! schema version, dropping it, and reporting its status. Each pending step
//! runs in its own transaction together with the row that records it, so a
//! failed step leaves the database at the previous version.
//!
//! # Example
//!
//! ```no_run
//! use stockroom_sqlite::Migration;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("stockroom.db").unwrap();
//! let mut migration = Migration::new(conn).unwrap();
//!
//! // Apply pending steps
//! let applied = migration.up().unwrap();
//! println!("applied {} migration(s)", applied.len());
//!
//! // Check status
//! let status = migration.status().unwrap();
//! assert_eq!(status.pending, 0);
//! ```

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::error::{Result, SqliteError};
use crate::schema::{DROP_SQL, MIGRATIONS, MIGRATIONS_TABLE_SQL, MigrationStep};

/// Manages the lifecycle of the inventory tables.
///
/// Applies embedded [`MigrationStep`]s ([`up`](Self::up)), drops every
/// table ([`down`](Self::down)), and reports what has been applied
/// ([`status`](Self::status)).
pub struct Migration {
    conn: Connection,
}

impl Migration {
    /// Creates a new migration manager for the given connection.
    pub fn new(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Applies every pending step in version order.
    ///
    /// Returns the versions applied by this call; an up-to-date database
    /// yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::ChecksumMismatch`] if an applied step's SQL has
    /// changed since it was recorded, and [`SqliteError::MigrationError`] if
    /// a step fails to execute.
    pub fn up(&mut self) -> Result<Vec<u32>> {
        self.apply(MIGRATIONS)
    }

    fn apply(&mut self, steps: &[MigrationStep]) -> Result<Vec<u32>> {
        self.conn.execute_batch(MIGRATIONS_TABLE_SQL)?;
        let recorded = self.recorded_checksums()?;

        let mut applied = Vec::new();
        for step in steps {
            let expected = step.checksum();
            if let Some((name, checksum)) = recorded.get(&step.version) {
                if *checksum != expected {
                    return Err(SqliteError::ChecksumMismatch {
                        version: step.version,
                        name: name.clone(),
                        recorded: checksum.clone(),
                        expected,
                    });
                }
                continue;
            }

            debug!(version = step.version, name = step.name, "applying migration");
            let tx = self.conn.transaction()?;
            tx.execute_batch(step.sql).map_err(|e| {
                SqliteError::MigrationError(format!(
                    "failed to apply migration {} ({}): {e}",
                    step.version, step.name
                ))
            })?;
            tx.execute(
                "INSERT INTO schema_migrations (version, name, checksum, applied_at) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    step.version,
                    step.name,
                    expected,
                    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
                ],
            )?;
            tx.commit()?;
            applied.push(step.version);
        }

        if !applied.is_empty() {
            info!(versions = ?applied, "database schema migrated");
        }
        Ok(applied)
    }

    /// Drops the item table and the migration record.
    ///
    /// Uses `DROP TABLE IF EXISTS` so it is safe to call even if tables
    /// do not exist. Executes within a transaction for atomicity.
    pub fn down(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(DROP_SQL)
            .map_err(|e| SqliteError::MigrationError(format!("failed to drop tables: {e}")))?;
        tx.commit()?;
        info!("database schema dropped");
        Ok(())
    }

    /// Returns the current status of the migration.
    pub fn status(&self) -> Result<MigrationStatus> {
        if !self.table_exists("schema_migrations")? {
            return Ok(MigrationStatus {
                applied: Vec::new(),
                pending: MIGRATIONS.len(),
                item_count: None,
            });
        }

        let applied = self.applied_migrations()?;
        let pending = MIGRATIONS
            .iter()
            .filter(|step| !applied.iter().any(|a| a.version == step.version))
            .count();

        let item_count = if self.table_exists("item")? {
            let count: i64 = self
                .conn
                .query_row("SELECT COUNT(*) FROM item", [], |row| row.get(0))?;
            Some(count as usize)
        } else {
            None
        };

        Ok(MigrationStatus {
            applied,
            pending,
            item_count,
        })
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the migration and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn recorded_checksums(&self) -> Result<HashMap<u32, (String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT version, name, checksum FROM schema_migrations")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, u32>(0)?, (row.get(1)?, row.get(2)?)))
            })?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;
        Ok(rows)
    }

    fn applied_migrations(&self) -> Result<Vec<AppliedMigration>> {
        let mut stmt = self.conn.prepare(
            "SELECT version, name, checksum, applied_at FROM schema_migrations ORDER BY version",
        )?;
        let raw: Vec<(u32, String, String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))?
            .collect::<std::result::Result<_, _>>()?;

        raw.into_iter()
            .map(|(version, name, checksum, applied_at)| {
                let parsed = DateTime::parse_from_rfc3339(&applied_at).map_err(|source| {
                    SqliteError::InvalidTimestamp {
                        value: applied_at.clone(),
                        source,
                    }
                })?;
                Ok(AppliedMigration {
                    version,
                    name,
                    checksum,
                    applied_at: parsed.with_timezone(&Utc),
                })
            })
            .collect()
    }
}

/// A migration recorded in `schema_migrations`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub version: u32,
    pub name: String,
    pub checksum: String,
    pub applied_at: DateTime<Utc>,
}

/// Snapshot of the schema state, returned by [`Migration::status`].
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Applied migrations, oldest first.
    pub applied: Vec<AppliedMigration>,
    /// Number of embedded steps not yet applied.
    pub pending: usize,
    /// Rows in `item`, or `None` when the table does not exist.
    pub item_count: Option<usize>,
}

impl MigrationStatus {
    /// Highest applied version, or 0 for an empty database.
    pub fn current_version(&self) -> u32 {
        self.applied.iter().map(|a| a.version).max().unwrap_or(0)
    }
}
