//! Feature toggle route guard.
//!
//! Gates routes behind a named feature toggle. When the toggle is disabled the
//! request is rejected with 403 "Feature disabled"; otherwise it passes through
//! unchanged. The enabled check itself cannot fail (unknown keys and store
//! outages resolve to enabled), so a broken toggle store never blocks traffic.
//!
//! ```ignore
//! Router::new()
//!     .route("/api/v1/events/:event_id", delete(events::delete_event))
//!     .route_layer(middleware::from_fn_with_state(
//!         FeatureGate::new(state.features.clone(), "delete_events"),
//!         require_feature,
//!     ))
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::FeatureToggleService;
use metrics::counter;
use serde_json::json;

/// State for [`require_feature`]: the feature to check and where to check it.
#[derive(Clone)]
pub struct FeatureGate {
    features: Arc<FeatureToggleService>,
    feature_key: &'static str,
}

impl FeatureGate {
    pub fn new(features: Arc<FeatureToggleService>, feature_key: &'static str) -> Self {
        Self {
            features,
            feature_key,
        }
    }
}

/// Helper to create a feature disabled response (403).
pub fn feature_disabled_response(feature_key: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "Feature disabled",
            "message": format!("The '{}' feature is currently disabled", feature_key)
        })),
    )
        .into_response()
}

/// Middleware that rejects the request when the gate's feature is disabled.
pub async fn require_feature(
    State(gate): State<FeatureGate>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !gate.features.is_enabled(gate.feature_key).await {
        counter!("feature_guard_rejections_total", "feature" => gate.feature_key).increment(1);
        tracing::debug!(feature_key = gate.feature_key, "Rejected request for disabled feature");
        return feature_disabled_response(gate.feature_key);
    }
    next.run(req).await
}
