//! Feature toggle service.
//!
//! Single entry point for querying and mutating feature toggles. Enabled
//! checks go through the cache and never fail; administrative reads and
//! writes go straight to the store and propagate its errors. Every successful
//! mutation invalidates the cache after the store has applied it.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::cache::{CacheStatus, FeatureToggleCache};
use super::defaults::DefaultFeature;
use super::store::{FeatureToggleStore, StoreError};
use crate::models::{FeatureToggle, NewFeatureToggle};

/// Outcome of [`FeatureToggleService::initialize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitializationReport {
    pub store_reachable: bool,
    /// Keys created during this run.
    pub created: Vec<String>,
    /// Keys that were already present.
    pub existing: Vec<String>,
    /// Keys whose lookup or creation failed.
    pub failed: Vec<String>,
    /// Whether the closing cache refresh succeeded.
    pub cache_loaded: bool,
}

pub struct FeatureToggleService {
    store: Arc<dyn FeatureToggleStore>,
    cache: FeatureToggleCache,
}

impl FeatureToggleService {
    pub fn new(store: Arc<dyn FeatureToggleStore>, cache_ttl: Duration) -> Self {
        let cache = FeatureToggleCache::new(Arc::clone(&store), cache_ttl);
        Self { store, cache }
    }

    /// Probe the store, seed `defaults` that are missing, then load the cache.
    ///
    /// Never fails: an unreachable store is logged and the service keeps
    /// answering enabled checks fail-open.
    pub async fn initialize(&self, defaults: &[DefaultFeature]) -> InitializationReport {
        let mut report = InitializationReport::default();

        if let Err(e) = self.store.ping().await {
            warn!(error = %e, "Feature toggle store unreachable, skipping initialization");
            return report;
        }
        report.store_reachable = true;

        for feature in defaults {
            match self.store.find_by_key(feature.key).await {
                Ok(Some(_)) => report.existing.push(feature.key.to_string()),
                Ok(None) => match self.store.insert(&feature.to_new_toggle()).await {
                    Ok(_) => report.created.push(feature.key.to_string()),
                    // Another instance seeded it between our lookup and insert.
                    Err(StoreError::Duplicate(_)) => {
                        report.existing.push(feature.key.to_string())
                    }
                    Err(e) => {
                        warn!(feature_key = feature.key, error = %e, "Failed to seed feature toggle");
                        report.failed.push(feature.key.to_string());
                    }
                },
                Err(e) => {
                    warn!(feature_key = feature.key, error = %e, "Failed to look up feature toggle");
                    report.failed.push(feature.key.to_string());
                }
            }
        }

        report.cache_loaded = self.cache.force_refresh().await;

        info!(
            created = report.created.len(),
            existing = report.existing.len(),
            failed = report.failed.len(),
            "Feature toggles initialized"
        );
        report
    }

    /// Whether `feature_key` is enabled. Unknown keys and store outages
    /// resolve to `true`.
    pub async fn is_enabled(&self, feature_key: &str) -> bool {
        self.cache.is_enabled(feature_key).await
    }

    /// Enabled state of every known toggle, as currently cached.
    pub async fn enabled_features(&self) -> HashMap<String, bool> {
        self.cache.snapshot().await.as_ref().clone()
    }

    /// All toggles ordered by category, then name.
    pub async fn get_all_features(&self) -> Result<Vec<FeatureToggle>, StoreError> {
        let mut features = self.store.list_all().await?;
        features.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.feature_name.cmp(&b.feature_name))
                .then_with(|| a.feature_key.cmp(&b.feature_key))
        });
        Ok(features)
    }

    /// Toggles in `category` ordered by name.
    pub async fn get_features_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<FeatureToggle>, StoreError> {
        let mut features = self.store.list_by_category(category).await?;
        features.sort_by(|a, b| {
            a.feature_name
                .cmp(&b.feature_name)
                .then_with(|| a.feature_key.cmp(&b.feature_key))
        });
        Ok(features)
    }

    pub async fn get_feature(&self, feature_key: &str) -> Result<Option<FeatureToggle>, StoreError> {
        self.store.find_by_key(feature_key).await
    }

    /// Set the enabled state of an existing toggle and return it.
    ///
    /// Returns `None` when no toggle has that key.
    pub async fn update_feature(
        &self,
        feature_key: &str,
        is_enabled: bool,
    ) -> Result<Option<FeatureToggle>, StoreError> {
        let updated = self.store.update_enabled(feature_key, is_enabled).await?;
        if updated.is_some() {
            self.cache.invalidate().await;
            info!(feature_key, is_enabled, "Feature toggle updated");
        }
        Ok(updated)
    }

    /// Create a toggle. Fails with [`StoreError::Duplicate`] if the key exists.
    pub async fn create_feature(
        &self,
        toggle: NewFeatureToggle,
    ) -> Result<FeatureToggle, StoreError> {
        let created = self.store.insert(&toggle).await?;
        self.cache.invalidate().await;
        info!(feature_key = %created.feature_key, "Feature toggle created");
        Ok(created)
    }

    /// Delete a toggle. Returns `false` when no toggle has that key.
    pub async fn delete_feature(&self, feature_key: &str) -> Result<bool, StoreError> {
        let deleted = self.store.delete_by_key(feature_key).await?;
        if deleted {
            self.cache.invalidate().await;
            info!(feature_key, "Feature toggle deleted");
        }
        Ok(deleted)
    }

    pub async fn get_categories(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.store.distinct_categories().await?.into_iter().collect())
    }

    /// Reload the cache regardless of its age.
    pub async fn force_refresh(&self) -> bool {
        self.cache.force_refresh().await
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }

    pub async fn cache_status(&self) -> CacheStatus {
        self.cache.status().await
    }

    /// Reachability of the backing store.
    pub async fn ping_store(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}
