//! Runtime configuration for the `stockroom` binary.
//!
//! Values are resolved per key, first match wins:
//!
//! 1. command-line flags
//! 2. `STOCKROOM_*` environment variables (a `.env` file is loaded first)
//! 3. an optional YAML file named by `--config` or `STOCKROOM_CONFIG`
//! 4. built-in defaults
//!
//! # Example YAML
//!
//! ```yaml
//! db_path: /var/lib/stockroom/stock.db
//! timeout_secs: 5
//! retries: 1
//! log_level: info
//! ```

use std::fmt::Display;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

pub const DB_PATH_VAR: &str = "STOCKROOM_DB_PATH";
pub const TIMEOUT_VAR: &str = "STOCKROOM_TIMEOUT_SECS";
pub const RETRIES_VAR: &str = "STOCKROOM_RETRIES";
pub const LOG_LEVEL_VAR: &str = "STOCKROOM_LOG_LEVEL";
pub const CONFIG_VAR: &str = "STOCKROOM_CONFIG";

pub const DEFAULT_DB_PATH: &str = "stockroom.db";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
/// SQLite takes the busy timeout as `i32` milliseconds.
pub const MAX_TIMEOUT_SECS: u64 = i32::MAX as u64 / 1000;
pub const DEFAULT_RETRIES: u32 = 1;
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::WARN;

/// Errors found while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {source_name}: {reason}")]
    InvalidValue {
        source_name: String,
        value: String,
        reason: String,
    },

    #[error("failed to read config file '{}': {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub db: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub retries: Option<u32>,
    pub log_level: Option<String>,
    pub config: Option<PathBuf>,
}

/// Settings read from the YAML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub db_path: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub retries: Option<u32>,
    pub log_level: Option<String>,
}

impl FileConfig {
    /// Loads the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadFile`] if the file cannot be opened and
    /// [`ConfigError::ParseFile`] if it is not valid YAML for this layout.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub timeout: Duration,
    pub retries: u32,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retries: DEFAULT_RETRIES,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl Config {
    /// Resolves configuration from flags and the process environment.
    pub fn from_env(flags: &Overrides) -> Result<Self, Vec<ConfigError>> {
        Self::resolve(flags, |key| std::env::var(key).ok())
    }

    /// Resolves configuration from flags and a variable lookup.
    ///
    /// Every problem is collected so they can be reported together.
    pub fn resolve(
        flags: &Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Vec<ConfigError>> {
        let mut errors = Vec::new();
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let file_path = flags
            .config
            .clone()
            .or_else(|| var(CONFIG_VAR).map(PathBuf::from));
        let file = match file_path {
            Some(path) => FileConfig::load(&path).unwrap_or_else(|e| {
                errors.push(e);
                FileConfig::default()
            }),
            None => FileConfig::default(),
        };
        let file_source = |key: &str| format!("config file key `{key}`");

        let db_path = flags
            .db
            .clone()
            .or_else(|| var(DB_PATH_VAR).map(PathBuf::from))
            .or(file.db_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let timeout_secs = flags
            .timeout_secs
            .or_else(|| parse_var(&var, TIMEOUT_VAR, &mut errors))
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if !(1..=MAX_TIMEOUT_SECS).contains(&timeout_secs) {
            errors.push(ConfigError::InvalidValue {
                source_name: "timeout".to_string(),
                value: timeout_secs.to_string(),
                reason: format!("must be between 1 and {MAX_TIMEOUT_SECS} seconds"),
            });
        }

        let retries = flags
            .retries
            .or_else(|| parse_var(&var, RETRIES_VAR, &mut errors))
            .or(file.retries)
            .unwrap_or(DEFAULT_RETRIES);

        let log_level = match (&flags.log_level, var(LOG_LEVEL_VAR), &file.log_level) {
            (Some(flag), _, _) => parse_value("--log-level", flag, &mut errors),
            (None, Some(env_value), _) => {
                parse_value(&format!("`{LOG_LEVEL_VAR}`"), &env_value, &mut errors)
            }
            (None, None, Some(file_value)) => {
                parse_value(&file_source("log_level"), file_value, &mut errors)
            }
            (None, None, None) => None,
        }
        .unwrap_or(DEFAULT_LOG_LEVEL);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Config {
            db_path,
            timeout: Duration::from_secs(timeout_secs),
            retries,
            log_level,
        })
    }
}

fn parse_var<T>(
    var: impl Fn(&str) -> Option<String>,
    key: &str,
    errors: &mut Vec<ConfigError>,
) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = var(key)?;
    parse_value(&format!("`{key}`"), &raw, errors)
}

fn parse_value<T>(source_name: &str, raw: &str, errors: &mut Vec<ConfigError>) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(ConfigError::InvalidValue {
                source_name: source_name.to_string(),
                value: raw.to_string(),
                reason: e.to_string(),
            });
            None
        }
    }
}
