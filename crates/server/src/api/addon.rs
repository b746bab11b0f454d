//! Media player addon handlers: manifest, catalog and streams.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use cloudplay_core::catalog::{CatalogResponse, Manifest, StreamResponse};
use tracing::debug;

use crate::state::AppState;

/// Addon resource ids arrive with a `.json` suffix.
fn strip_json(id: &str) -> &str {
    id.strip_suffix(".json").unwrap_or(id)
}

/// GET /{token}/manifest.json
pub async fn manifest(Path(_token): Path<String>) -> Json<Manifest> {
    Json(cloudplay_core::catalog::manifest())
}

/// GET /{token}/catalog/{type}/{id}
///
/// Lists the account's video files. Errors yield an empty catalog.
pub async fn catalog(
    State(state): State<Arc<AppState>>,
    Path((token, content_type, id)): Path<(String, String, String)>,
) -> Json<CatalogResponse> {
    let id = strip_json(&id);
    debug!("Catalog request: {}/{}", content_type, id);

    let metas = state.catalog().catalog(&token, &content_type, id).await;
    Json(CatalogResponse { metas })
}

/// GET /{token}/catalog/{type}/{id}/{extra}
///
/// Extra arguments (search, paging) are not supported; the full catalog
/// is returned.
pub async fn catalog_with_extra(
    state: State<Arc<AppState>>,
    Path((token, content_type, id, _extra)): Path<(String, String, String, String)>,
) -> Json<CatalogResponse> {
    catalog(state, Path((token, content_type, id))).await
}

/// GET /{token}/stream/{type}/{id}
pub async fn stream(
    State(state): State<Arc<AppState>>,
    Path((token, content_type, id)): Path<(String, String, String)>,
) -> Json<StreamResponse> {
    let id = strip_json(&id);
    debug!("Stream request: {}/{}", content_type, id);

    let streams = state.catalog().streams(&token, &content_type, id).await;
    Json(StreamResponse { streams })
}
