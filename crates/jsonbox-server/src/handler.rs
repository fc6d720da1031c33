use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use bytes::Bytes;
use jsonbox_store::{DocumentStore, PutReceipt, StorageUsage};
use serde::{Deserialize, Serialize};

use crate::error::ServerResult;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

/// Body of a successful `PUT /store/{path}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PutResponse {
    pub status: String,
    /// The sanitized key the document was stored under.
    pub path: String,
    pub storage_used_mb: f64,
}

impl From<PutReceipt> for PutResponse {
    fn from(receipt: PutReceipt) -> Self {
        Self {
            status: "success".into(),
            storage_used_mb: receipt.storage_used_mb(),
            path: receipt.key.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UsageResponse {
    pub documents: usize,
    pub used_bytes: u64,
    pub limit_bytes: u64,
    pub storage_used_mb: f64,
}

impl From<StorageUsage> for UsageResponse {
    fn from(usage: StorageUsage) -> Self {
        Self {
            storage_used_mb: usage.used_mb(),
            documents: usage.documents,
            used_bytes: usage.used_bytes,
            limit_bytes: usage.limit_bytes,
        }
    }
}

/// Store a JSON document under `path`.
///
/// The store does blocking file I/O while holding its index lock, so the
/// call runs on the blocking pool.
pub async fn put_document(
    State(state): State<AppState>,
    Path(path): Path<String>,
    body: Bytes,
) -> ServerResult<Json<PutResponse>> {
    let store = Arc::clone(&state.store);
    let receipt = tokio::task::spawn_blocking(move || store.put(&path, &body)).await??;
    tracing::info!(
        key = %receipt.key,
        size = receipt.size,
        total_bytes = receipt.total_bytes,
        "document stored"
    );
    Ok(Json(receipt.into()))
}

/// Return the stored bytes for `path` verbatim.
pub async fn get_document(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ServerResult<Response> {
    let store = Arc::clone(&state.store);
    let document = tokio::task::spawn_blocking(move || store.get(&path)).await??;
    Ok(([(header::CONTENT_TYPE, "application/json")], document).into_response())
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Current storage usage against the budget.
pub async fn usage_handler(State(state): State<AppState>) -> ServerResult<Json<UsageResponse>> {
    let store = Arc::clone(&state.store);
    let usage = tokio::task::spawn_blocking(move || store.usage()).await?;
    Ok(Json(usage.into()))
}
