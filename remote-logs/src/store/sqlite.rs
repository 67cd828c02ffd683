//! SQLite log store.

use std::time::Duration;

use async_trait::async_trait;
use rusqlite::types::{Type, ValueRef};
use rusqlite::{Connection, OpenFlags, Row, params};

use super::LogStore;
use crate::config::{SqliteStorageConfig, validate_table_name};
use crate::error::{Error, Result};
use crate::model::{LogId, LogRecord, leading_integer};

/// SQLite-backed log store.
///
/// The database and its table are owned by an external collector; this store
/// only reads. Every call opens a fresh read-only connection on the blocking
/// pool so no connection outlives a request, and so an unreachable database
/// surfaces as [`Error::Connection`] on the request that hit it.
pub struct SqliteLogStore {
    config: SqliteStorageConfig,
    select_sql: String,
    count_sql: String,
}

impl SqliteLogStore {
    /// Creates a store for the configured database.
    ///
    /// Does not touch the database; connection problems are reported per
    /// query. Fails only if the configured table name is not a plain
    /// identifier.
    pub fn new(config: SqliteStorageConfig) -> Result<Self> {
        validate_table_name(&config.table)?;
        let select_sql = format!(
            "SELECT id, received_at, hostname, facility, message, port \
             FROM {} WHERE id > ?1 ORDER BY id ASC LIMIT ?2",
            config.table
        );
        let count_sql = format!("SELECT COUNT(*) FROM {} WHERE id > ?1", config.table);
        Ok(Self {
            config,
            select_sql,
            count_sql,
        })
    }

    fn connect(path: &str, busy_timeout: Duration) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| Error::Connection(format!("failed to open {}: {}", path, e)))?;
        conn.busy_timeout(busy_timeout)
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(conn)
    }

    /// Runs `f` against a fresh connection on the blocking thread pool.
    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let path = self.config.path.clone();
        let busy_timeout = Duration::from_millis(self.config.busy_timeout_ms);
        tokio::task::spawn_blocking(move || {
            let conn = Self::connect(&path, busy_timeout)?;
            f(&conn)
        })
        .await?
    }
}

/// SQLite stores integers as i64; cursors beyond that range match nothing.
fn sql_cursor(after: LogId) -> i64 {
    i64::try_from(after).unwrap_or(i64::MAX)
}

/// Reads a column as text.
///
/// The collector owns the schema, so a single odd cell must not fail the
/// whole page: numbers are rendered as digits, invalid UTF-8 is replaced
/// lossily and blobs are decoded the same way.
fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
    })
}

/// Reads a column as an integer, truncating reals and parsing leading digits
/// of text. Anything unreadable is 0.
fn integer_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Integer(i) => i,
        ValueRef::Real(f) => f as i64,
        ValueRef::Text(bytes) => leading_integer(&String::from_utf8_lossy(bytes)),
        ValueRef::Null | ValueRef::Blob(_) => 0,
    })
}

fn decode_record(row: &Row<'_>) -> rusqlite::Result<LogRecord> {
    let id: i64 = row.get(0)?;
    Ok(LogRecord {
        id: LogId::try_from(id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(e))
        })?,
        received_at: text_column(row, 1)?,
        hostname: text_column(row, 2)?,
        facility: text_column(row, 3)?,
        message: text_column(row, 4)?,
        port: integer_column(row, 5)?,
    })
}

#[async_trait]
impl LogStore for SqliteLogStore {
    async fn fetch_after(&self, after: LogId, limit: Option<usize>) -> Result<Vec<LogRecord>> {
        let sql = self.select_sql.clone();
        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        self.with_connection(move |conn| {
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| Error::Query(e.to_string()))?;
            let rows = stmt
                .query_map(params![sql_cursor(after), limit], decode_record)
                .map_err(|e| Error::Query(e.to_string()))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| Error::Query(e.to_string()))
        })
        .await
    }

    async fn count_after(&self, after: LogId) -> Result<u64> {
        let sql = self.count_sql.clone();
        self.with_connection(move |conn| {
            let total: i64 = conn
                .query_row(&sql, params![sql_cursor(after)], |row| row.get(0))
                .map_err(|e| Error::Query(e.to_string()))?;
            Ok(total.max(0) as u64)
        })
        .await
    }
}
