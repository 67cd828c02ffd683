//! Cursor-driven retrieval.
//!
//! [`CursorQueryEngine`] turns a client cursor into a [`LogBatch`]: every
//! record newer than the cursor in ascending id order, the number of records
//! still available past the cursor, and the cursor to poll with next.
//!
//! # Consistency
//!
//! The records and the total are read with two independent store calls and
//! no enclosing transaction. Because records are append-only, a row inserted
//! between the two calls can only raise `total_available` above what the
//! fetch saw; existing rows never change. Clients pick such rows up on their
//! next poll.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{LogBatch, LogId};
use crate::store::LogStore;

/// Per-request options for [`CursorQueryEngine::fetch_with_options`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Maximum number of records to return.
    ///
    /// When `None` (the default) every record past the cursor is returned,
    /// subject only to the engine's configured maximum page size.
    pub limit: Option<usize>,
}

/// Stateless query engine over a [`LogStore`].
///
/// The engine keeps no per-client state; each call is a function of the
/// store contents and the supplied cursor.
#[derive(Clone)]
pub struct CursorQueryEngine {
    store: Arc<dyn LogStore>,
    max_page_size: Option<usize>,
}

impl CursorQueryEngine {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self {
            store,
            max_page_size: None,
        }
    }

    /// Caps every response at `max_page_size` records. `None` disables the cap.
    pub fn with_max_page_size(mut self, max_page_size: Option<usize>) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// Returns all records newer than `cursor`.
    ///
    /// A cursor of `0` reads from the beginning.
    pub async fn fetch(&self, cursor: LogId) -> Result<LogBatch> {
        self.fetch_with_options(cursor, FetchOptions::default())
            .await
    }

    /// Returns records newer than `cursor` using custom options.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::Connection`] when the store is unreachable and
    /// [`Error::Query`] when it is reachable but the read fails. Both are
    /// logged here with their internal detail.
    pub async fn fetch_with_options(
        &self,
        cursor: LogId,
        options: FetchOptions,
    ) -> Result<LogBatch> {
        let limit = self.effective_limit(options.limit);

        let records = self
            .store
            .fetch_after(cursor, limit)
            .await
            .inspect_err(|e| log_store_failure("fetch", cursor, e))?;

        let total_available = self
            .store
            .count_after(cursor)
            .await
            .inspect_err(|e| log_store_failure("count", cursor, e))?;

        if records.windows(2).any(|w| w[0].id >= w[1].id) {
            let err = Error::Internal("store returned records out of id order".to_string());
            log_store_failure("fetch", cursor, &err);
            return Err(err);
        }

        tracing::debug!(
            cursor,
            count = records.len(),
            total_available,
            "fetched log records"
        );

        Ok(LogBatch::new(cursor, records, total_available))
    }

    /// Verifies the store can answer a query, without reading any rows.
    pub async fn check_store(&self) -> Result<()> {
        self.store.count_after(LogId::MAX).await.map(|_| ())
    }

    fn effective_limit(&self, requested: Option<usize>) -> Option<usize> {
        match (requested, self.max_page_size) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

fn log_store_failure(operation: &str, cursor: LogId, err: &Error) {
    match err {
        Error::Connection(msg) => {
            tracing::error!(operation, cursor, error = %msg, "log store connection failed")
        }
        Error::Query(msg) => {
            tracing::error!(operation, cursor, error = %msg, "log store query failed")
        }
        other => tracing::error!(operation, cursor, error = %other, "log retrieval failed"),
    }
}
