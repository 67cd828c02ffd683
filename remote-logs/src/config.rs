//! Configuration for the remote logs service.
//!
//! This module defines the configuration structs that control where log
//! records are read from and how callers are authenticated. Configuration is
//! loaded from a YAML file and/or CLI flags at startup and injected into the
//! store, the credential validator and the query engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default table holding ingested log lines.
pub const DEFAULT_TABLE: &str = "remote_logs";

/// Top-level service configuration.
///
/// # Example
///
/// ```ignore
/// use remote_logs::{Config, SecretKey, StorageConfig};
///
/// let config = Config {
///     storage: StorageConfig::InMemory,
///     secret_key: Some(SecretKey::new("sk_test")),
///     max_page_size: None,
/// };
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Shared secret every caller must present.
    ///
    /// Optional here so it can be supplied from the CLI or environment
    /// instead of the file; the server refuses to start without one.
    #[serde(default)]
    pub secret_key: Option<SecretKey>,

    /// Upper bound on records returned per request.
    ///
    /// When `None` (the default) the whole remaining set is returned in a
    /// single response.
    #[serde(default)]
    pub max_page_size: Option<usize>,
}

/// Storage backend configuration.
///
/// Defaults to a SQLite database at `remote_logs.db` reading the
/// `remote_logs` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum StorageConfig {
    /// Volatile in-process store, useful for testing and development.
    InMemory,
    /// SQLite database populated by an external collector.
    Sqlite(SqliteStorageConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Sqlite(SqliteStorageConfig::default())
    }
}

/// SQLite-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SqliteStorageConfig {
    /// Path to the database file. The file must already exist.
    pub path: String,

    /// Table holding the log records.
    #[serde(default = "default_table")]
    pub table: String,

    /// Milliseconds to wait on a locked database before failing a query.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl Default for SqliteStorageConfig {
    fn default() -> Self {
        Self {
            path: "remote_logs.db".to_string(),
            table: default_table(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

/// Shared secret presented by callers.
///
/// The `Debug` implementation is redacted so the secret never ends up in
/// logs when configuration is printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the raw secret bytes.
    pub fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Load configuration from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref())
        .map_err(|e| Error::InvalidInput(format!("Failed to read config file: {}", e)))?;

    serde_yaml::from_str(&contents)
        .map_err(|e| Error::InvalidInput(format!("Failed to parse config file: {}", e)))
}

/// Check that `name` is a plain SQL identifier.
///
/// Table names are interpolated into queries, so only
/// `[A-Za-z_][A-Za-z0-9_]*` is accepted.
pub fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("invalid table name: {:?}", name)))
    }
}
