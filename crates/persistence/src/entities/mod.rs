//! Database entity definitions (row mappings).

pub mod feature_toggle;

pub use feature_toggle::FeatureToggleEntity;
