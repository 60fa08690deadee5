//! Feature toggle administration routes.
//!
//! These routes require admin API key authentication. Every mutation goes
//! through the service, which invalidates the toggle cache so the next check
//! sees the change.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::routes::health::FeatureCacheHealth;
use domain::models::{
    FeatureCategoriesResponse, FeatureToggle, FeatureToggleQuery, FeatureTogglesResponse,
    NewFeatureToggle, UpdateFeatureToggleRequest,
};

/// Response for a forced cache refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRefreshResponse {
    pub refreshed: bool,
    pub cache: FeatureCacheHealth,
}

fn not_found(feature_key: &str) -> ApiError {
    ApiError::NotFound(format!("Feature '{}' not found", feature_key))
}

/// GET /api/v1/admin/features
///
/// Lists all toggles, optionally restricted to one category.
pub async fn list_features(
    State(state): State<AppState>,
    Query(query): Query<FeatureToggleQuery>,
) -> Result<Json<FeatureTogglesResponse>, ApiError> {
    let features = match query.category.as_deref() {
        Some(category) => state.features.get_features_by_category(category).await?,
        None => state.features.get_all_features().await?,
    };

    Ok(Json(FeatureTogglesResponse {
        total: features.len(),
        features,
    }))
}

/// POST /api/v1/admin/features
pub async fn create_feature(
    State(state): State<AppState>,
    Json(request): Json<NewFeatureToggle>,
) -> Result<(StatusCode, Json<FeatureToggle>), ApiError> {
    request.validate()?;

    let created = state.features.create_feature(request).await?;

    info!(
        feature_key = %created.feature_key,
        category = %created.category,
        is_enabled = created.is_enabled,
        "Admin created feature toggle"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/admin/features/:feature_key
pub async fn get_feature(
    State(state): State<AppState>,
    Path(feature_key): Path<String>,
) -> Result<Json<FeatureToggle>, ApiError> {
    state
        .features
        .get_feature(&feature_key)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(&feature_key))
}

/// PUT /api/v1/admin/features/:feature_key
///
/// Enables or disables a toggle and returns its new state.
pub async fn update_feature(
    State(state): State<AppState>,
    Path(feature_key): Path<String>,
    Json(request): Json<UpdateFeatureToggleRequest>,
) -> Result<Json<FeatureToggle>, ApiError> {
    let updated = state
        .features
        .update_feature(&feature_key, request.is_enabled)
        .await?
        .ok_or_else(|| not_found(&feature_key))?;

    info!(
        feature_key = %feature_key,
        is_enabled = updated.is_enabled,
        "Admin updated feature toggle"
    );

    Ok(Json(updated))
}

/// DELETE /api/v1/admin/features/:feature_key
pub async fn delete_feature(
    State(state): State<AppState>,
    Path(feature_key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.features.delete_feature(&feature_key).await? {
        return Err(not_found(&feature_key));
    }

    info!(feature_key = %feature_key, "Admin deleted feature toggle");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/feature-categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<FeatureCategoriesResponse>, ApiError> {
    let categories = state.features.get_categories().await?;
    Ok(Json(FeatureCategoriesResponse { categories }))
}

/// POST /api/v1/admin/feature-cache/refresh
///
/// Reloads the toggle cache immediately. A failed reload keeps the previous
/// entries and is reported as `refreshed: false`.
pub async fn refresh_cache(State(state): State<AppState>) -> Json<CacheRefreshResponse> {
    let refreshed = state.features.force_refresh().await;
    info!(refreshed, "Admin forced feature cache refresh");

    Json(CacheRefreshResponse {
        refreshed,
        cache: state.features.cache_status().await.into(),
    })
}
