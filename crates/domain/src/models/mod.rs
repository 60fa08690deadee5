//! Domain models for TeamMove.

pub mod feature_toggle;

pub use feature_toggle::{
    EnabledFeaturesResponse, FeatureCategoriesResponse, FeatureStatusResponse, FeatureToggle,
    FeatureToggleQuery, FeatureTogglesResponse, NewFeatureToggle, UpdateFeatureToggleRequest,
    DEFAULT_CATEGORY,
};
