//! Repository implementations for database operations.

pub mod feature_toggle;

pub use feature_toggle::FeatureToggleRepository;
