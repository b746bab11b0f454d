//! Torrent resolve handler.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use cloudplay_core::resolver::{ResolveError, TorrentDescriptor, TIMEOUT_GUIDANCE};
use serde::Deserialize;
use tracing::info;

use super::handlers::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ResolveParams {
    #[serde(default)]
    pub name: Option<String>,
    /// Comma-separated tracker URLs.
    #[serde(default)]
    pub trackers: Option<String>,
    #[serde(default, rename = "fileIdx")]
    pub file_idx: Option<u32>,
}

impl ResolveParams {
    fn into_descriptor(self, info_hash: String) -> TorrentDescriptor {
        let trackers: Vec<String> = self
            .trackers
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();

        let mut descriptor = TorrentDescriptor::new(info_hash)
            .with_display_name(self.name.unwrap_or_default())
            .with_trackers(trackers);
        if let Some(index) = self.file_idx {
            descriptor = descriptor.with_file_index(index);
        }
        descriptor
    }
}

/// GET /{token}/resolve/{info_hash}?name=&trackers=&fileIdx=
///
/// Redirects to a playback URL once the cloud account has the file.
/// Holds the request open while the download runs.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Path((token, info_hash)): Path<(String, String)>,
    Query(params): Query<ResolveParams>,
) -> Response {
    let descriptor = params.into_descriptor(info_hash);
    info!(
        "Resolve request for {} ({})",
        descriptor.info_hash, descriptor.display_name
    );

    match state.engine().resolve(&token, &descriptor).await {
        Ok(target) => Redirect::temporary(&target.playback_url).into_response(),
        Err(ResolveError::Timeout { .. }) => (
            StatusCode::REQUEST_TIMEOUT,
            Json(ErrorResponse {
                error: "Download timeout".to_string(),
                message: Some(TIMEOUT_GUIDANCE.to_string()),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
                message: None,
            }),
        )
            .into_response(),
    }
}
