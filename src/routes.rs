//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{token}`  - Redirect by hash id or custom hash
//! - `GET  /health`   - Storage health check
//! - `/api/*`         - JSON API for links and users
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket, can be switched off with `RATE_LIMIT=false`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `rate_limited` - when `true`, requests are limited per peer IP; the server
///   must then be run with connect info
pub fn app_router(state: AppState, rate_limited: bool) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, rate_limited))
}

/// All routes with tracing and optional rate limiting, without path normalization.
pub fn router(state: AppState, rate_limited: bool) -> Router {
    let mut api_router = api::routes::api_routes();
    let mut public_router = Router::new()
        .route("/{token}", get(redirect_handler))
        .route("/health", get(health_handler));

    if rate_limited {
        api_router = api_router.layer(rate_limit::api_layer());
        public_router = public_router.layer(rate_limit::layer());
    }

    public_router
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer())
}
