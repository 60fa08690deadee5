//! Feature toggle domain models.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation::{validate_category, validate_feature_key};

/// Category assigned to toggles created without one.
pub const DEFAULT_CATEGORY: &str = "general";

/// A named boolean switch gating one capability of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureToggle {
    pub id: Uuid,
    pub feature_key: String,
    pub feature_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_enabled: bool,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a feature toggle.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewFeatureToggle {
    #[validate(custom(function = "validate_feature_key"))]
    pub feature_key: String,
    #[validate(length(min = 1, max = 100, message = "Feature name must be 1-100 characters"))]
    pub feature_name: String,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    #[validate(custom(function = "validate_category"))]
    pub category: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl NewFeatureToggle {
    /// Category to persist, falling back to [`DEFAULT_CATEGORY`].
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }
}

/// Request to flip a feature toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFeatureToggleRequest {
    pub is_enabled: bool,
}

/// Query parameters for the admin listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureToggleQuery {
    pub category: Option<String>,
}

/// Admin listing response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureTogglesResponse {
    pub features: Vec<FeatureToggle>,
    pub total: usize,
}

/// Public response with the enabled state of every known toggle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnabledFeaturesResponse {
    pub features: BTreeMap<String, bool>,
}

/// Public response for a single toggle check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStatusResponse {
    pub feature_key: String,
    pub enabled: bool,
}

/// Distinct categories response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureCategoriesResponse {
    pub categories: BTreeSet<String>,
}
