//! # CLI Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command line (--database)             (highest priority)            │
//! │  2. Environment variables                                               │
//! │     STOCKBOOK_DB_PATH=/srv/stockbook/ledger.db                          │
//! │     STOCKBOOK_LOCK_TIMEOUT_MS=2000                                      │
//! │     (a .env file in the working directory is loaded first)              │
//! │  3. TOML config file                                                    │
//! │     --config <FILE>, or stockbook.toml in the platform config dir       │
//! │     ~/.config/stockbook/stockbook.toml (Linux)                          │
//! │  4. Default values                        (lowest priority)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/srv/stockbook/ledger.db"
//! max_connections = 8
//! lock_timeout_ms = 2000
//!
//! [retry]
//! max_attempts = 5
//! initial_backoff_ms = 50
//! max_backoff_ms = 2000
//!
//! [logging]
//! filter = "info,stockbook=debug,sqlx=warn"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stockbook_db::{DbConfig, RetryPolicy};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default tracing filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,stockbook=debug,sqlx=warn";

const DATABASE_FILE: &str = "ledger.db";
const CONFIG_FILE: &str = "stockbook.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine a data directory; set STOCKBOOK_DB_PATH")]
    NoDataDir,
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Ledger file. `None` means `ledger.db` in the platform data dir.
    pub path: Option<PathBuf>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Longest wait for a lock before a command fails with BUSY.
    pub lock_timeout_ms: u64,
    pub run_migrations: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: 5,
            acquire_timeout_secs: 30,
            lock_timeout_ms: 5_000,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file
    /// 3. `STOCKBOOK_*` environment variables
    ///
    /// An explicitly given file must exist; the default location may not.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading config file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `STOCKBOOK_*` overrides read through `lookup`.
    ///
    /// Unparseable numbers are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("STOCKBOOK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        override_number(&lookup, "STOCKBOOK_MAX_CONNECTIONS", &mut self.database.max_connections);
        override_number(&lookup, "STOCKBOOK_LOCK_TIMEOUT_MS", &mut self.database.lock_timeout_ms);
        override_number(&lookup, "STOCKBOOK_RETRY_ATTEMPTS", &mut self.retry.max_attempts);

        if let Some(filter) = lookup("STOCKBOOK_LOG") {
            self.logging.filter = filter;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        if self.database.lock_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "database.lock_timeout_ms must be positive".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }

        if self.retry.multiplier < 1.0 {
            return Err(ConfigError::Invalid(
                "retry.multiplier must be at least 1.0".to_string(),
            ));
        }

        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(ConfigError::Invalid(
                "retry.initial_backoff_ms exceeds retry.max_backoff_ms".to_string(),
            ));
        }

        Ok(())
    }

    /// The ledger file, falling back to the platform data directory.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = directories::ProjectDirs::from("com", "stockbook", "stockbook")
            .ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

        Ok(data_dir.join(DATABASE_FILE))
    }

    pub fn db_config(&self) -> Result<DbConfig, ConfigError> {
        let settings = &self.database;
        Ok(DbConfig::new(self.database_path()?)
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .lock_timeout(Duration::from_millis(settings.lock_timeout_ms))
            .run_migrations(settings.run_migrations))
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockbook", "stockbook")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

fn override_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    let Some(raw) = lookup(key) else {
        return;
    };

    match raw.parse() {
        Ok(value) => *target = value,
        Err(_) => warn!(key = %key, value = %raw, "Ignoring unparseable environment override"),
    }
}
