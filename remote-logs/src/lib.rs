//! Remote Logs - cursor-based pull API over an append-only log table.
//!
//! An external collector writes syslog lines into a table where every row
//! gets a strictly increasing `id`. Clients poll this service with the last
//! id they consumed and receive every newer row, in id order, together with
//! the cursor to use on their next poll.
//!
//! # Key Concepts
//!
//! - **LogStore**: Read access to the persisted records. Backed by SQLite or,
//!   for tests, an in-memory vector.
//! - **CursorQueryEngine**: Turns a cursor into a [`LogBatch`]. Stateless; the
//!   server never remembers client cursors.
//! - **CredentialValidator**: Authenticates callers. The shipped
//!   implementation compares a shared secret in constant time.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use remote_logs::{CursorQueryEngine, StorageConfig, open_store};
//!
//! let store = open_store(&StorageConfig::InMemory)?;
//! let engine = CursorQueryEngine::new(store);
//!
//! let mut cursor = 0;
//! loop {
//!     let batch = engine.fetch(cursor).await?;
//!     for record in &batch.records {
//!         println!("{} {:?}", record.id, record.message);
//!     }
//!     if let Some(next) = batch.next_last_id {
//!         cursor = next;
//!     }
//! }
//! ```

mod auth;
mod config;
mod error;
mod model;
mod query;
#[cfg(feature = "http-server")]
pub mod server;
mod store;

pub use auth::{CredentialValidator, SharedSecretValidator};
pub use config::{
    Config, DEFAULT_TABLE, SecretKey, SqliteStorageConfig, StorageConfig, load_config,
};
pub use error::{Error, Result};
pub use model::{LogBatch, LogId, LogRecord};
pub use query::{CursorQueryEngine, FetchOptions};
pub use store::{InMemoryLogStore, LogStore, SqliteLogStore, open_store};
