//! Read access to the persisted log records.
//!
//! The store is an external, append-only collaborator: another process
//! inserts rows and assigns ids, this service only reads. [`LogStore`] is the
//! seam between the query engine and a concrete backend; [`open_store`]
//! creates one from configuration.

mod in_memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StorageConfig;
use crate::error::Result;
use crate::model::{LogId, LogRecord};

pub use in_memory::InMemoryLogStore;
pub use sqlite::SqliteLogStore;

/// Read operations over the log record collection.
///
/// Implementations must return records in strictly ascending id order and
/// must distinguish an unreachable store ([`Error::Connection`]) from a
/// failed query ([`Error::Query`]).
///
/// [`Error::Connection`]: crate::Error::Connection
/// [`Error::Query`]: crate::Error::Query
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Returns records with `id > after`, ascending by id.
    ///
    /// `after == 0` returns every record. When `limit` is set, at most that
    /// many records are returned, taken from the low end of the range.
    async fn fetch_after(&self, after: LogId, limit: Option<usize>) -> Result<Vec<LogRecord>>;

    /// Counts records with `id > after`.
    async fn count_after(&self, after: LogId) -> Result<u64>;
}

/// Creates a log store based on the provided configuration.
///
/// # Examples
///
/// ```rust,ignore
/// use remote_logs::{StorageConfig, open_store};
///
/// let store = open_store(&StorageConfig::InMemory)?;
/// ```
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn LogStore>> {
    match config {
        StorageConfig::InMemory => Ok(Arc::new(InMemoryLogStore::new())),
        StorageConfig::Sqlite(sqlite_config) => {
            Ok(Arc::new(SqliteLogStore::new(sqlite_config.clone())?))
        }
    }
}
