//! HTTP server for the remote logs API.
//!
//! This module exposes the cursor query engine behind a single authenticated
//! POST endpoint, plus index, metrics and health routes.

mod config;
mod error;
pub mod handlers;
mod http;
pub mod metrics;
mod middleware;
mod request;
mod response;

pub use config::{CliArgs, LogServerConfig};
pub use error::ApiError;
pub use http::{LogServer, build_router};
