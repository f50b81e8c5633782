//! Embedded, versioned SQL for the inventory schema.
//!
//! Each [`MigrationStep`] carries a version, a short name, and the SQL that
//! moves the schema from the previous version to this one. Steps are applied
//! in ascending version order and recorded in `schema_migrations` together
//! with a SHA-256 checksum of their SQL, so an edited step is detected
//! instead of silently diverging.
//!
//! # Table structure
//!
//! - `item`: one row per inventory item; `sku` carries a `UNIQUE`
//!   constraint and `amount` defaults to 0
//! - `schema_migrations`: the applied versions

use sha2::{Digest, Sha256};

/// One forward schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStep {
    /// Strictly increasing schema version.
    pub version: u32,
    /// Short human-readable name.
    pub name: &'static str,
    /// SQL executed as a batch inside a transaction.
    pub sql: &'static str,
}

impl MigrationStep {
    /// SHA-256 of the step's SQL as lower-case hex.
    pub fn checksum(&self) -> String {
        checksum(self.sql)
    }
}

/// Every migration the application knows about, oldest first.
pub static MIGRATIONS: &[MigrationStep] = &[
    MigrationStep {
        version: 1,
        name: "create_item",
        sql: r#"
CREATE TABLE IF NOT EXISTS item (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    brand TEXT NOT NULL,
    sku TEXT NOT NULL UNIQUE,
    category TEXT NOT NULL,
    location TEXT NOT NULL,
    amount INTEGER NOT NULL DEFAULT 0
);
"#,
    },
    MigrationStep {
        version: 2,
        name: "index_item_search_columns",
        sql: r#"
CREATE INDEX IF NOT EXISTS idx_item_name ON item(name);
CREATE INDEX IF NOT EXISTS idx_item_brand ON item(brand);
CREATE INDEX IF NOT EXISTS idx_item_category ON item(category);
"#,
    },
];

pub(crate) const MIGRATIONS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    checksum TEXT NOT NULL,
    applied_at TEXT NOT NULL
);
"#;

pub(crate) const DROP_SQL: &str = r#"
DROP TABLE IF EXISTS item;
DROP TABLE IF EXISTS schema_migrations;
"#;

/// SHA-256 of `sql` as lower-case hex.
pub(crate) fn checksum(sql: &str) -> String {
    let digest = Sha256::digest(sql.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Latest schema version known to this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |step| step.version)
}
