//! HTTP server for jsonbox.
//!
//! Exposes a [`DocumentStore`](jsonbox_store::DocumentStore) over REST:
//! `PUT`/`GET /store/{path}` for documents, plus health and usage endpoints.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{AppState, HealthResponse, PutResponse, UsageResponse};
pub use server::JsonboxServer;
