//! Storage abstraction for feature toggles.
//!
//! The cache and service only depend on this trait; the PostgreSQL
//! repository and the in-memory store both implement it directly.

use thiserror::Error;

use crate::models::{FeatureToggle, NewFeatureToggle};

/// Errors surfaced by a feature toggle store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Feature toggle already exists: {0}")]
    Duplicate(String),

    #[error("Feature toggle store unavailable: {0}")]
    Unavailable(String),

    #[error("Feature toggle store error: {0}")]
    Backend(String),
}

/// Persistent table of feature toggles keyed by `feature_key`.
#[async_trait::async_trait]
pub trait FeatureToggleStore: Send + Sync {
    /// Cheap reachability check against the backing table.
    async fn ping(&self) -> Result<(), StoreError>;

    /// All toggles, in no guaranteed order.
    async fn list_all(&self) -> Result<Vec<FeatureToggle>, StoreError>;

    /// Toggles whose category equals `category`.
    async fn list_by_category(&self, category: &str) -> Result<Vec<FeatureToggle>, StoreError>;

    async fn find_by_key(&self, feature_key: &str) -> Result<Option<FeatureToggle>, StoreError>;

    /// Inserts a new toggle. Fails with [`StoreError::Duplicate`] when the key exists.
    async fn insert(&self, toggle: &NewFeatureToggle) -> Result<FeatureToggle, StoreError>;

    /// Sets `is_enabled` and refreshes `updated_at`. `None` when the key is unknown.
    async fn update_enabled(
        &self,
        feature_key: &str,
        is_enabled: bool,
    ) -> Result<Option<FeatureToggle>, StoreError>;

    /// Returns whether a row was removed.
    async fn delete_by_key(&self, feature_key: &str) -> Result<bool, StoreError>;

    async fn distinct_categories(&self) -> Result<Vec<String>, StoreError>;
}
