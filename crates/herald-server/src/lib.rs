//! # herald-server
//!
//! Axum HTTP server in front of the notification hub.
//!
//! - `GET /events`: server-sent event stream, one [`connection::ConnectionHandler`] per client
//! - `POST /send-notification`: validated ingestion into the hub
//! - `GET /health`, `GET /metrics`: liveness and Prometheus metrics
//! - Static assets served as the router fallback
//! - Graceful shutdown via a shared `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod connection;
pub mod errors;
pub mod health;
pub mod ingest;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod stream;

pub use config::ServerConfig;
pub use connection::{ConnectionError, ConnectionHandler, ConnectionOutcome};
pub use errors::{ApiError, ServerError};
pub use server::{AppState, HeraldServer};
pub use shutdown::ShutdownCoordinator;
