//! In-memory log store for tests and local development.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::LogStore;
use crate::error::Result;
use crate::model::{LogId, LogRecord};

/// In-process log store.
///
/// Rows live in a vector kept in id order; ids are assigned on
/// [`append`](InMemoryLogStore::append) starting at 1. Intended for tests and
/// local development, since nothing is persisted.
#[derive(Default)]
pub struct InMemoryLogStore {
    rows: RwLock<Vec<LogRecord>>,
}

impl InMemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record, overwriting its `id` with the next store-assigned id.
    ///
    /// Returns the assigned id.
    pub async fn append(&self, mut record: LogRecord) -> LogId {
        let mut rows = self.rows.write().await;
        let id = rows.last().map_or(1, |last| last.id + 1);
        record.id = id;
        rows.push(record);
        id
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

/// Index of the first row with `id > after`.
fn first_after(rows: &[LogRecord], after: LogId) -> usize {
    rows.partition_point(|r| r.id <= after)
}

#[async_trait]
impl LogStore for InMemoryLogStore {
    async fn fetch_after(&self, after: LogId, limit: Option<usize>) -> Result<Vec<LogRecord>> {
        let rows = self.rows.read().await;
        let tail = &rows[first_after(&rows, after)..];
        let take = limit.unwrap_or(tail.len()).min(tail.len());
        Ok(tail[..take].to_vec())
    }

    async fn count_after(&self, after: LogId) -> Result<u64> {
        let rows = self.rows.read().await;
        Ok((rows.len() - first_after(&rows, after)) as u64)
    }
}
