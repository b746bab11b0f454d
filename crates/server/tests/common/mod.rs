//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! backed by a mock cloud account and a recording sleeper, so resolutions
//! finish instantly and deterministically.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use cloudplay_core::{
    testing::{MockCloudStorage, RecordingSleeper},
    CatalogService, Config, ResolutionEngine, ResolverConfig,
};
use cloudplay_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use cloudplay_core::testing::fixtures;

/// Access token used in fixture paths.
pub const TOKEN: &str = "test-token";

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_catalog() {
///     let fixture = TestFixture::new();
///     fixture.cloud.push_files(vec![fixtures::cloud_file("1", "Movie.mkv")]).await;
///
///     let response = fixture.get("/test-token/catalog/other/seedr-files.json").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock cloud account - script transfers, files and playback links
    pub cloud: Arc<MockCloudStorage>,
    /// Records poll and settle delays instead of waiting
    pub sleeper: Arc<RecordingSleeper>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
    pub location: Option<String>,
    pub content_type: Option<String>,
}

impl TestFixture {
    /// Create a new test fixture with default resolver settings.
    pub fn new() -> Self {
        Self::with_resolver(ResolverConfig::default())
    }

    /// Create a test fixture with custom resolver settings.
    pub fn with_resolver(resolver: ResolverConfig) -> Self {
        let cloud = Arc::new(MockCloudStorage::new());
        let sleeper = Arc::new(RecordingSleeper::new());

        let config = Config {
            resolver: resolver.clone(),
            ..Default::default()
        };

        let engine = Arc::new(
            ResolutionEngine::new(resolver, Arc::clone(&cloud) as _)
                .with_sleeper(Arc::clone(&sleeper) as _),
        );
        let catalog = Arc::new(CatalogService::new(
            Arc::clone(&cloud) as _,
            &config.catalog,
        ));

        let state = Arc::new(AppState::with_components(config, engine, catalog));
        let router = create_router(state);

        Self {
            router,
            cloud,
            sleeper,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a request with an Origin header, as a browser would.
    pub async fn get_with_origin(
        &self,
        path: &str,
        origin: &str,
    ) -> (TestResponse, Option<String>) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let allow_origin = header_string(response.headers(), header::ACCESS_CONTROL_ALLOW_ORIGIN);

        (Self::read(response).await, allow_origin)
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        Self::read(response).await
    }

    async fn read(response: axum::response::Response) -> TestResponse {
        let status = response.status();
        let location = header_string(response.headers(), header::LOCATION);
        let content_type = header_string(response.headers(), header::CONTENT_TYPE);

        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            body,
            text,
            location,
            content_type,
        }
    }
}

fn header_string(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
