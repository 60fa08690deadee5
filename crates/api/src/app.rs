use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::FeatureToggleService;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, require_admin, trace_id};
use crate::routes::{admin_features, features, health};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub features: Arc<FeatureToggleService>,
}

pub fn create_app(config: Config, features: Arc<FeatureToggleService>) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        config: config.clone(),
        features,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Admin routes (require admin API key)
    let admin_routes = Router::new()
        .route(
            "/api/v1/admin/features",
            get(admin_features::list_features).post(admin_features::create_feature),
        )
        .route(
            "/api/v1/admin/features/:feature_key",
            get(admin_features::get_feature)
                .put(admin_features::update_feature)
                .delete(admin_features::delete_feature),
        )
        .route(
            "/api/v1/admin/feature-categories",
            get(admin_features::list_categories),
        )
        .route(
            "/api/v1/admin/feature-cache/refresh",
            post(admin_features::refresh_cache),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/api/v1/features", get(features::list_enabled_features))
        .route(
            "/api/v1/features/:feature_key",
            get(features::get_feature_status),
        )
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
