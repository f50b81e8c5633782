//! Error types for SQLite setup and migration.
//!
//! Repository calls report [`RepositoryError`](stockroom_core::RepositoryError)
//! from the core crate. This type covers everything around them: opening the
//! database, checking it is reachable, and moving the schema between
//! versions.

use thiserror::Error;

/// Errors that can occur while opening or migrating the database.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// The database could not be opened or did not answer a ping.
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// Migration lifecycle operation failure.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// An applied migration no longer matches the embedded SQL.
    #[error(
        "checksum mismatch for migration {version} ({name}): recorded {recorded}, expected {expected}"
    )]
    ChecksumMismatch {
        version: u32,
        name: String,
        recorded: String,
        expected: String,
    },

    /// A stored timestamp could not be parsed.
    #[error("invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
