use axum::{
    body::Body,
    http::Request,
    middleware::from_fn,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{addon, handlers, middleware, resolve};
use crate::metrics::normalize_path;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Addon routes, scoped by the user's access token
    let addon_routes = Router::new()
        .route("/{token}/manifest.json", get(addon::manifest))
        .route(
            "/{token}/catalog/{content_type}/{id}",
            get(addon::catalog),
        )
        .route(
            "/{token}/catalog/{content_type}/{id}/{extra}",
            get(addon::catalog_with_extra),
        )
        .route("/{token}/stream/{content_type}/{id}", get(addon::stream))
        .route("/{token}/resolve/{info_hash}", get(resolve::resolve))
        .with_state(state);

    // Spans carry the normalized path so access tokens stay out of logs.
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::info_span!(
            "http.request",
            method = %request.method(),
            route = %normalize_path(request.uri().path()),
        )
    });

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .merge(addon_routes)
        .layer(from_fn(middleware::metrics_middleware))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
}
