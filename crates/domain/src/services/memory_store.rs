//! In-memory feature toggle store for development and testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{FeatureToggleStore, StoreError};
use crate::models::{FeatureToggle, NewFeatureToggle};

/// Process-local store keyed by `feature_key`.
///
/// Can be switched into an unavailable state to exercise failure paths.
#[derive(Debug, Default)]
pub struct InMemoryFeatureToggleStore {
    toggles: RwLock<BTreeMap<String, FeatureToggle>>,
    unavailable: AtomicBool,
    list_all_calls: AtomicUsize,
}

impl InMemoryFeatureToggleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `(key, enabled)` pairs in the default category.
    pub fn with_entries(entries: &[(&str, bool)]) -> Self {
        let now = Utc::now();
        let toggles = entries
            .iter()
            .map(|(key, enabled)| {
                let toggle = FeatureToggle {
                    id: Uuid::new_v4(),
                    feature_key: key.to_string(),
                    feature_name: key.to_string(),
                    description: None,
                    is_enabled: *enabled,
                    category: crate::models::DEFAULT_CATEGORY.to_string(),
                    created_at: now,
                    updated_at: now,
                };
                (key.to_string(), toggle)
            })
            .collect();

        Self {
            toggles: RwLock::new(toggles),
            ..Self::default()
        }
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`] (or recover).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `list_all` calls served so far, failed ones included.
    pub fn list_all_calls(&self) -> usize {
        self.list_all_calls.load(Ordering::SeqCst)
    }

    /// Number of stored toggles, bypassing the failure switch.
    pub async fn len(&self) -> usize {
        self.toggles.read().await.len()
    }

    /// Whether the store holds no toggles, bypassing the failure switch.
    pub async fn is_empty(&self) -> bool {
        self.toggles.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store switched off".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl FeatureToggleStore for InMemoryFeatureToggleStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }

    async fn list_all(&self) -> Result<Vec<FeatureToggle>, StoreError> {
        self.list_all_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.toggles.read().await.values().cloned().collect())
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<FeatureToggle>, StoreError> {
        self.check_available()?;
        Ok(self
            .toggles
            .read()
            .await
            .values()
            .filter(|t| t.category == category)
            .cloned()
            .collect())
    }

    async fn find_by_key(&self, feature_key: &str) -> Result<Option<FeatureToggle>, StoreError> {
        self.check_available()?;
        Ok(self.toggles.read().await.get(feature_key).cloned())
    }

    async fn insert(&self, toggle: &NewFeatureToggle) -> Result<FeatureToggle, StoreError> {
        self.check_available()?;
        let mut toggles = self.toggles.write().await;
        if toggles.contains_key(&toggle.feature_key) {
            return Err(StoreError::Duplicate(toggle.feature_key.clone()));
        }

        let now = Utc::now();
        let created = FeatureToggle {
            id: Uuid::new_v4(),
            feature_key: toggle.feature_key.clone(),
            feature_name: toggle.feature_name.clone(),
            description: toggle.description.clone(),
            is_enabled: toggle.is_enabled,
            category: toggle.category_or_default().to_string(),
            created_at: now,
            updated_at: now,
        };
        toggles.insert(created.feature_key.clone(), created.clone());
        Ok(created)
    }

    async fn update_enabled(
        &self,
        feature_key: &str,
        is_enabled: bool,
    ) -> Result<Option<FeatureToggle>, StoreError> {
        self.check_available()?;
        let mut toggles = self.toggles.write().await;
        Ok(toggles.get_mut(feature_key).map(|toggle| {
            toggle.is_enabled = is_enabled;
            toggle.updated_at = Utc::now();
            toggle.clone()
        }))
    }

    async fn delete_by_key(&self, feature_key: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self.toggles.write().await.remove(feature_key).is_some())
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        let mut categories: Vec<String> = self
            .toggles
            .read()
            .await
            .values()
            .map(|t| t.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }
}
