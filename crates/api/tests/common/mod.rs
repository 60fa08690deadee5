//! Common test utilities for integration tests.
//!
//! The app under test runs over an in-memory toggle store, so these tests need
//! no database.

// Not every integration test uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use domain::services::{
    FeatureToggleService, FeatureToggleStore, InMemoryFeatureToggleStore, DEFAULT_CACHE_TTL,
    DEFAULT_FEATURES,
};
use serde_json::Value;
use teammove_api::{
    app::create_app,
    config::{
        Config, DatabaseConfig, FeaturesConfig, LoggingConfig, SecurityConfig, ServerConfig,
    },
    middleware::ADMIN_KEY_HEADER,
};

pub const TEST_ADMIN_KEY: &str = "test-admin-key";

/// Create a test configuration.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 5,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            admin_api_key: TEST_ADMIN_KEY.to_string(),
        },
        features: FeaturesConfig::default(),
    }
}

/// An app together with the store and service behind it.
pub struct TestApp {
    pub app: Router,
    pub store: Arc<InMemoryFeatureToggleStore>,
    pub features: Arc<FeatureToggleService>,
}

/// Build an app over `store` without seeding anything.
pub async fn create_test_app_with_store(
    config: Config,
    store: Arc<InMemoryFeatureToggleStore>,
) -> TestApp {
    let features = Arc::new(FeatureToggleService::new(
        store.clone() as Arc<dyn FeatureToggleStore>,
        DEFAULT_CACHE_TTL,
    ));
    features.initialize(&[]).await;

    TestApp {
        app: create_app(config, features.clone()),
        store,
        features,
    }
}

/// Build an app seeded with the default feature list.
pub async fn create_test_app() -> TestApp {
    let store = Arc::new(InMemoryFeatureToggleStore::new());
    let features = Arc::new(FeatureToggleService::new(
        store.clone() as Arc<dyn FeatureToggleStore>,
        DEFAULT_CACHE_TTL,
    ));
    let report = features.initialize(DEFAULT_FEATURES).await;
    assert_eq!(report.created.len(), DEFAULT_FEATURES.len());

    TestApp {
        app: create_app(test_config(), features.clone()),
        store,
        features,
    }
}

/// Send a request through a clone of the router.
pub async fn send(app: &Router, request: Request<Body>) -> Response {
    use tower::ServiceExt;
    app.clone().oneshot(request).await.unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Admin request carrying the test admin key.
pub fn admin_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    admin_request_with_key(method, uri, body, TEST_ADMIN_KEY)
}

pub fn admin_request_with_key(
    method: Method,
    uri: &str,
    body: Option<Value>,
    key: &str,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(ADMIN_KEY_HEADER, key);

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Parse response body as JSON.
pub async fn parse_response_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}
