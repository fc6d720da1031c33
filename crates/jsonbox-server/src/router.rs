use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

pub mod endpoints {
    pub const STORE: &str = "/store/*path";
    pub const HEALTH: &str = "/v1/health";
    pub const USAGE: &str = "/v1/usage";
}

/// Build the axum router with all jsonbox endpoints.
///
/// Request bodies are capped at the store's budget since nothing larger
/// could ever be admitted.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let body_limit = usize::try_from(state.store.limit()).unwrap_or(usize::MAX);

    Router::new()
        .route(
            endpoints::STORE,
            get(handler::get_document).put(handler::put_document),
        )
        .route(endpoints::HEALTH, get(handler::health_handler))
        .route(endpoints::USAGE, get(handler::usage_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin when none are configured, otherwise only the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
