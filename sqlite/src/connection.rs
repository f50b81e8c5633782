//! Opening a ready-to-use database connection.
//!
//! [`open_database`] is the one entry point the command-line front end
//! uses: it opens the file, bounds lock waits, checks that the database
//! answers, and brings the schema up to date before anything else runs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Result, SqliteError};
use crate::migration::Migration;

/// Path that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Default per-operation time budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest time budget SQLite accepts as a busy timeout (`i32` milliseconds).
pub const MAX_TIMEOUT: Duration = Duration::from_millis(i32::MAX as u64);

/// Where the database lives and how long a storage call may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Database file, or [`IN_MEMORY`].
    pub path: PathBuf,
    /// Upper bound for a single storage call, lock waits included.
    pub timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn is_in_memory(&self) -> bool {
        self.path == Path::new(IN_MEMORY)
    }
}

/// Opens, pings, and migrates the configured database.
///
/// # Errors
///
/// Returns [`SqliteError::ConnectionError`] if the file cannot be opened or
/// does not answer, and any migration error from [`Migration::up`].
///
/// # Examples
///
/// ```
/// use stockroom_sqlite::{DatabaseConfig, IN_MEMORY, open_database};
///
/// let conn = open_database(&DatabaseConfig::new(IN_MEMORY)).unwrap();
/// let items: i64 = conn.query_row("SELECT COUNT(*) FROM item", [], |r| r.get(0)).unwrap();
/// assert_eq!(items, 0);
/// ```
pub fn open_database(config: &DatabaseConfig) -> Result<Connection> {
    let conn = if config.is_in_memory() {
        Connection::open_in_memory()
    } else {
        Connection::open(&config.path)
    }
    .map_err(|e| {
        SqliteError::ConnectionError(format!(
            "failed to open database '{}': {e}",
            config.path.display()
        ))
    })?;

    set_busy_timeout(&conn, config.timeout)?;
    ping(&conn).map_err(|e| {
        SqliteError::ConnectionError(format!(
            "unable to verify connection status of '{}': {e}",
            config.path.display()
        ))
    })?;
    debug!(path = %config.path.display(), "database connection verified");

    let mut migration = Migration::new(conn)?;
    migration.up()?;
    Ok(migration.into_connection())
}

/// Bounds how long `conn` waits on a locked database.
///
/// # Errors
///
/// Returns [`SqliteError::ConnectionError`] if `timeout` exceeds
/// [`MAX_TIMEOUT`].
pub fn set_busy_timeout(conn: &Connection, timeout: Duration) -> Result<()> {
    if timeout > MAX_TIMEOUT {
        return Err(SqliteError::ConnectionError(format!(
            "timeout of {}s exceeds the maximum of {}s",
            timeout.as_secs(),
            MAX_TIMEOUT.as_secs()
        )));
    }
    conn.busy_timeout(timeout)?;
    Ok(())
}

fn ping(conn: &Connection) -> rusqlite::Result<()> {
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .map(|_| ())
}
