//! Error types for remote log retrieval.
//!
//! This module defines [`Error`], the primary error type for store access and
//! cursor queries, along with a convenient [`Result`] type alias.

/// Error type for remote log operations.
///
/// # Error Categories
///
/// - [`Connection`](Error::Connection): The backing store could not be reached
///   or opened.
/// - [`Query`](Error::Query): The store was reachable but executing a query or
///   decoding its rows failed.
/// - [`InvalidInput`](Error::InvalidInput): Invalid configuration or arguments
///   provided by the caller.
/// - [`Internal`](Error::Internal): Unexpected internal errors that indicate bugs
///   or invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The store is unreachable.
    ///
    /// Raised when a connection to the backing database cannot be opened,
    /// e.g. the database file is missing or permissions are wrong.
    Connection(String),

    /// Query execution against a reachable store failed.
    ///
    /// Covers statement preparation, execution and row decoding failures,
    /// such as a missing table or a column holding an unexpected type.
    Query(String),

    /// Invalid input or parameter errors.
    InvalidInput(String),

    /// Internal errors indicating bugs or invariant violations.
    Internal(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Connection(msg) => write!(f, "Connection error: {}", msg),
            Error::Query(msg) => write!(f, "Query error: {}", msg),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::InvalidInput(msg.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Internal(format!("blocking store task failed: {}", err))
    }
}

/// Result type alias for remote log operations.
///
/// This is a convenience alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
