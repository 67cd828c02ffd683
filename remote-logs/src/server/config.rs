//! Configuration for the log HTTP server.

use clap::Parser;

use crate::config::{Config, SecretKey, SqliteStorageConfig, StorageConfig, load_config};
use crate::error::{Error, Result};

/// CLI arguments for the log server.
#[derive(Debug, Parser)]
#[command(name = "remote-logs")]
#[command(about = "Cursor-based pull API for remote syslog records")]
pub struct CliArgs {
    /// Path to a YAML configuration file.
    #[arg(short, long, env = "REMOTE_LOGS_CONFIG_FILE")]
    pub config: Option<String>,

    /// HTTP server port.
    #[arg(short, long, default_value = "8080", env = "REMOTE_LOGS_PORT")]
    pub port: u16,

    /// Shared secret callers must present. Overrides the config file.
    #[arg(long, env = "REMOTE_LOGS_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// SQLite database holding the log table. Overrides the config file.
    #[arg(long, env = "REMOTE_LOGS_SQLITE_PATH")]
    pub sqlite_path: Option<String>,

    /// Use an empty in-memory store (for testing).
    #[arg(long, default_value = "false")]
    pub in_memory: bool,
}

impl CliArgs {
    /// Build the service configuration: config file first, then CLI overrides.
    ///
    /// Fails if the file cannot be loaded or no non-empty secret key is set.
    pub fn to_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => Config::default(),
        };

        if self.in_memory {
            config.storage = StorageConfig::InMemory;
        } else if let Some(path) = &self.sqlite_path {
            config.storage = match config.storage {
                StorageConfig::Sqlite(sqlite) => StorageConfig::Sqlite(SqliteStorageConfig {
                    path: path.clone(),
                    ..sqlite
                }),
                StorageConfig::InMemory => StorageConfig::Sqlite(SqliteStorageConfig {
                    path: path.clone(),
                    ..Default::default()
                }),
            };
        }

        if let Some(secret) = &self.secret_key {
            config.secret_key = Some(SecretKey::new(secret.clone()));
        }

        match &config.secret_key {
            Some(secret) if !secret.is_empty() => Ok(config),
            _ => Err(Error::InvalidInput(
                "a secret key is required (--secret-key or secret_key in the config file)"
                    .to_string(),
            )),
        }
    }
}

/// Configuration for the log HTTP server.
#[derive(Debug, Clone)]
pub struct LogServerConfig {
    /// HTTP server port.
    pub port: u16,
}

impl Default for LogServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl From<&CliArgs> for LogServerConfig {
    fn from(args: &CliArgs) -> Self {
        Self { port: args.port }
    }
}
