//! Public feature toggle routes.
//!
//! Clients read the enabled state of toggles from here to shape their UI.
//! Both handlers answer from the cache and never fail.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::{EnabledFeaturesResponse, FeatureStatusResponse};

use crate::app::AppState;

/// GET /api/v1/features
///
/// Enabled state of every known toggle.
pub async fn list_enabled_features(State(state): State<AppState>) -> Json<EnabledFeaturesResponse> {
    let features = state.features.enabled_features().await;
    Json(EnabledFeaturesResponse {
        features: features.into_iter().collect(),
    })
}

/// GET /api/v1/features/:feature_key
///
/// Unknown keys report as enabled.
pub async fn get_feature_status(
    State(state): State<AppState>,
    Path(feature_key): Path<String>,
) -> Json<FeatureStatusResponse> {
    let enabled = state.features.is_enabled(&feature_key).await;
    Json(FeatureStatusResponse {
        feature_key,
        enabled,
    })
}
