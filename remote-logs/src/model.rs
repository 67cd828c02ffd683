//! Core data types for remote log retrieval.
//!
//! This module defines the record shape read from the store and the batch
//! returned to polling clients.

use serde::{Deserialize, Serialize};

/// Identifier of a stored log record.
///
/// Ids are assigned by the store on insert, increase strictly with insertion
/// order and are never reused. Clients use the last id they consumed as their
/// cursor; `0` means "from the beginning".
pub type LogId = u64;

/// A single ingested log line.
///
/// Records are immutable once written. The serialized field names and their
/// order (`id, received_at, hostname, facility, message, port`) are part of
/// the wire contract with polling clients.
///
/// # Example
///
/// ```
/// use remote_logs::LogRecord;
///
/// let record = LogRecord {
///     id: 1,
///     received_at: Some("2024-01-15 10:30:00".to_string()),
///     hostname: Some("web-01".to_string()),
///     facility: Some("auth".to_string()),
///     message: Some("session opened for user root".to_string()),
///     port: 514,
/// };
/// assert_eq!(record.id, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Store-assigned, strictly increasing identifier.
    pub id: LogId,

    /// Ingestion timestamp, passed through exactly as the store renders it.
    pub received_at: Option<String>,

    /// Originating host. May be absent or empty.
    pub hostname: Option<String>,

    /// Syslog facility classification.
    pub facility: Option<String>,

    /// Log payload.
    pub message: Option<String>,

    /// Source port the line was received from, as stored.
    pub port: i64,
}

/// Result of a cursor query.
///
/// `records` holds every record with `id > last_id_requested` in ascending id
/// order (possibly truncated by a page-size limit). `next_last_id` is the id
/// of the last returned record and is omitted when nothing was returned, so a
/// client simply feeds it back as its next cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogBatch {
    /// Records newer than the requested cursor, ascending by id.
    pub records: Vec<LogRecord>,

    /// Number of records in this batch.
    pub count: usize,

    /// Number of records in the store newer than the requested cursor.
    pub total_available: u64,

    /// The cursor as the client sent it.
    ///
    /// Signed because clients may send a negative cursor, which is echoed
    /// back unchanged while being read as 0.
    pub last_id_requested: i64,

    /// Cursor to send on the next poll. Absent when the batch is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_last_id: Option<LogId>,
}

impl LogBatch {
    /// Assembles a batch from ordered records and the independently counted total.
    pub fn new(last_id_requested: LogId, records: Vec<LogRecord>, total_available: u64) -> Self {
        let next_last_id = records.last().map(|r| r.id);
        Self {
            count: records.len(),
            records,
            total_available,
            last_id_requested: i64::try_from(last_id_requested).unwrap_or(i64::MAX),
            next_last_id,
        }
    }

    /// Replaces the echoed cursor with the value the client actually sent.
    pub fn with_last_id_requested(mut self, requested: i64) -> Self {
        self.last_id_requested = requested;
        self
    }

    /// Returns true if no records newer than the cursor were returned.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Integer value of the leading `[+-]digits` prefix of `s`, after leading
/// whitespace. No digits gives 0; out-of-range values saturate.
pub(crate) fn leading_integer(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for digit in rest.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(digit - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
    }
    value
}
