//! In-memory feature toggle cache with TTL-based lazy refresh.
//!
//! Reads are served from an immutable snapshot of `feature_key -> enabled`.
//! When the snapshot is older than the TTL (or was invalidated), the next read
//! reloads it from the store before answering. Store failures never reach the
//! caller: the previous snapshot stays in place and unknown keys are enabled.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::store::FeatureToggleStore;

/// Default time-to-live of a cache snapshot (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Reloads tried by one stale read before it settles for a superseded fetch.
const MAX_RELOAD_ATTEMPTS: usize = 3;

enum Reload {
    Installed(Arc<HashMap<String, bool>>),
    /// Fetched before an invalidation completed; not installed.
    Superseded(Arc<HashMap<String, bool>>),
    Failed,
}

struct CacheState {
    entries: Arc<HashMap<String, bool>>,
    last_refresh: Option<Instant>,
    /// Bumped by every invalidation; a reload started under an older
    /// generation is discarded.
    generation: u64,
}

/// Point-in-time view of the cache for health reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    pub entries: usize,
    pub last_refresh_age: Option<Duration>,
    pub ttl: Duration,
}

impl CacheStatus {
    /// Whether the next read would trigger a reload.
    pub fn is_stale(&self) -> bool {
        match self.last_refresh_age {
            Some(age) => age > self.ttl,
            None => true,
        }
    }
}

/// Feature toggle cache backed by a [`FeatureToggleStore`].
pub struct FeatureToggleCache {
    store: Arc<dyn FeatureToggleStore>,
    ttl: Duration,
    state: RwLock<CacheState>,
}

impl FeatureToggleCache {
    /// Create an empty cache. The first read loads it from `store`.
    pub fn new(store: Arc<dyn FeatureToggleStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            state: RwLock::new(CacheState {
                entries: Arc::new(HashMap::new()),
                last_refresh: None,
                generation: 0,
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Enabled state of `feature_key`, reloading first when stale.
    ///
    /// Keys missing from the snapshot are reported as enabled.
    pub async fn is_enabled(&self, feature_key: &str) -> bool {
        let entries = self.fresh_entries().await;
        let enabled = entries.get(feature_key).copied().unwrap_or(true);

        counter!(
            "feature_toggle_checks_total",
            "result" => if enabled { "enabled" } else { "disabled" }
        )
        .increment(1);

        enabled
    }

    /// Current snapshot of every known toggle, reloading first when stale.
    pub async fn snapshot(&self) -> Arc<HashMap<String, bool>> {
        self.fresh_entries().await
    }

    /// Drop all entries so the next read goes to the store.
    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.entries = Arc::new(HashMap::new());
        state.last_refresh = None;
        state.generation = state.generation.wrapping_add(1);
        debug!("Feature toggle cache invalidated");
    }

    /// Reload from the store regardless of the TTL.
    ///
    /// Returns `false` when the store read failed or the result was superseded
    /// by a concurrent invalidation; the previous snapshot is kept in both cases.
    pub async fn force_refresh(&self) -> bool {
        matches!(self.reload().await, Reload::Installed(_))
    }

    pub async fn status(&self) -> CacheStatus {
        let state = self.state.read().await;
        CacheStatus {
            entries: state.entries.len(),
            last_refresh_age: state.last_refresh.map(|at| at.elapsed()),
            ttl: self.ttl,
        }
    }

    async fn fresh_entries(&self) -> Arc<HashMap<String, bool>> {
        {
            let state = self.state.read().await;
            if !self.is_stale(&state) {
                return Arc::clone(&state.entries);
            }
        }

        // A superseded fetch is still a complete read of the store, so it
        // answers this call if every retry is superseded too. The cleared
        // snapshot left by the invalidation never does.
        let mut fetched = None;
        for _ in 0..MAX_RELOAD_ATTEMPTS {
            match self.reload().await {
                Reload::Installed(entries) => return entries,
                Reload::Superseded(entries) => fetched = Some(entries),
                Reload::Failed => break,
            }
        }

        match fetched {
            Some(entries) => entries,
            None => Arc::clone(&self.state.read().await.entries),
        }
    }

    fn is_stale(&self, state: &CacheState) -> bool {
        match state.last_refresh {
            Some(at) => at.elapsed() > self.ttl,
            None => true,
        }
    }

    async fn reload(&self) -> Reload {
        let generation = self.state.read().await.generation;

        let toggles = match self.store.list_all().await {
            Ok(toggles) => toggles,
            Err(e) => {
                counter!("feature_toggle_cache_reloads_total", "outcome" => "failed").increment(1);
                warn!(error = %e, "Failed to reload feature toggle cache, keeping previous entries");
                return Reload::Failed;
            }
        };

        let entries: Arc<HashMap<String, bool>> = Arc::new(
            toggles
                .into_iter()
                .map(|t| (t.feature_key, t.is_enabled))
                .collect(),
        );

        let mut state = self.state.write().await;
        if state.generation != generation {
            counter!("feature_toggle_cache_reloads_total", "outcome" => "superseded").increment(1);
            debug!("Discarding feature toggle reload superseded by invalidation");
            return Reload::Superseded(entries);
        }

        debug!(entries = entries.len(), "Feature toggle cache reloaded");
        state.entries = Arc::clone(&entries);
        state.last_refresh = Some(Instant::now());
        counter!("feature_toggle_cache_reloads_total", "outcome" => "success").increment(1);
        Reload::Installed(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeatureToggle, NewFeatureToggle};
    use crate::services::memory_store::InMemoryFeatureToggleStore;
    use crate::services::store::StoreError;
    use tokio::sync::{oneshot, Mutex, Notify};

    /// Store whose first `list_all` reads the data, then holds until released.
    struct HeldStore {
        inner: Arc<InMemoryFeatureToggleStore>,
        hold: Mutex<Option<oneshot::Receiver<()>>>,
        reading: Notify,
    }

    impl HeldStore {
        fn new(inner: Arc<InMemoryFeatureToggleStore>) -> (Arc<Self>, oneshot::Sender<()>) {
            let (release, hold) = oneshot::channel();
            let store = Arc::new(Self {
                inner,
                hold: Mutex::new(Some(hold)),
                reading: Notify::new(),
            });
            (store, release)
        }
    }

    #[async_trait::async_trait]
    impl FeatureToggleStore for HeldStore {
        async fn ping(&self) -> Result<(), StoreError> {
            self.inner.ping().await
        }

        async fn list_all(&self) -> Result<Vec<FeatureToggle>, StoreError> {
            let toggles = self.inner.list_all().await?;
            let hold = self.hold.lock().await.take();
            if let Some(hold) = hold {
                self.reading.notify_one();
                let _ = hold.await;
            }
            Ok(toggles)
        }

        async fn list_by_category(&self, category: &str) -> Result<Vec<FeatureToggle>, StoreError> {
            self.inner.list_by_category(category).await
        }

        async fn find_by_key(&self, feature_key: &str) -> Result<Option<FeatureToggle>, StoreError> {
            self.inner.find_by_key(feature_key).await
        }

        async fn insert(&self, toggle: &NewFeatureToggle) -> Result<FeatureToggle, StoreError> {
            self.inner.insert(toggle).await
        }

        async fn update_enabled(
            &self,
            feature_key: &str,
            is_enabled: bool,
        ) -> Result<Option<FeatureToggle>, StoreError> {
            self.inner.update_enabled(feature_key, is_enabled).await
        }

        async fn delete_by_key(&self, feature_key: &str) -> Result<bool, StoreError> {
            self.inner.delete_by_key(feature_key).await
        }

        async fn distinct_categories(&self) -> Result<Vec<String>, StoreError> {
            self.inner.distinct_categories().await
        }
    }

    fn cache_over(store: &Arc<InMemoryFeatureToggleStore>, ttl: Duration) -> FeatureToggleCache {
        FeatureToggleCache::new(store.clone() as Arc<dyn FeatureToggleStore>, ttl)
    }

    #[tokio::test]
    async fn test_unknown_key_is_enabled() {
        let store = Arc::new(InMemoryFeatureToggleStore::new());
        let cache = cache_over(&store, DEFAULT_CACHE_TTL);

        assert!(cache.is_enabled("nonexistent_key").await);
    }

    #[tokio::test]
    async fn test_first_read_loads_from_store() {
        let store = Arc::new(InMemoryFeatureToggleStore::with_entries(&[
            ("a", true),
            ("b", false),
        ]));
        let cache = cache_over(&store, DEFAULT_CACHE_TTL);

        assert!(cache.is_enabled("a").await);
        assert!(!cache.is_enabled("b").await);
        assert_eq!(store.list_all_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_within_ttl_do_not_hit_store() {
        let store = Arc::new(InMemoryFeatureToggleStore::with_entries(&[("a", true)]));
        let cache = cache_over(&store, Duration::from_secs(60));

        cache.is_enabled("a").await;
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.is_enabled("a").await;
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.is_enabled("a").await;

        assert_eq!(store.list_all_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_after_ttl_reloads() {
        let store = Arc::new(InMemoryFeatureToggleStore::with_entries(&[("a", true)]));
        let cache = cache_over(&store, Duration::from_secs(60));

        assert!(cache.is_enabled("a").await);
        store.update_enabled("a", false).await.unwrap();

        // Still served from the snapshot.
        assert!(cache.is_enabled("a").await);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!cache.is_enabled("a").await);
        assert_eq!(store.list_all_calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_next_read_to_store() {
        let store = Arc::new(InMemoryFeatureToggleStore::with_entries(&[("a", true)]));
        let cache = cache_over(&store, DEFAULT_CACHE_TTL);

        assert!(cache.is_enabled("a").await);
        store.update_enabled("a", false).await.unwrap();
        cache.invalidate().await;

        let status = cache.status().await;
        assert_eq!(status.entries, 0);
        assert!(status.last_refresh_age.is_none());
        assert!(status.is_stale());

        assert!(!cache.is_enabled("a").await);
        assert_eq!(store.list_all_calls(), 2);
    }

    #[tokio::test]
    async fn test_force_refresh_ignores_ttl() {
        let store = Arc::new(InMemoryFeatureToggleStore::with_entries(&[("a", true)]));
        let cache = cache_over(&store, DEFAULT_CACHE_TTL);

        assert!(cache.is_enabled("a").await);
        store.update_enabled("a", false).await.unwrap();

        assert!(cache.force_refresh().await);
        assert!(!cache.is_enabled("a").await);
        assert_eq!(store.list_all_calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_entries() {
        let store = Arc::new(InMemoryFeatureToggleStore::with_entries(&[
            ("a", true),
            ("b", false),
        ]));
        let cache = cache_over(&store, DEFAULT_CACHE_TTL);
        assert!(cache.force_refresh().await);

        store.set_unavailable(true);
        assert!(!cache.force_refresh().await);

        assert!(!cache.is_enabled("b").await);
        assert!(cache.is_enabled("a").await);
        assert_eq!(cache.status().await.entries, 2);
    }

    #[tokio::test]
    async fn test_unreachable_store_on_first_read_fails_open() {
        let store = Arc::new(InMemoryFeatureToggleStore::with_entries(&[("b", false)]));
        store.set_unavailable(true);
        let cache = cache_over(&store, DEFAULT_CACHE_TTL);

        assert!(cache.is_enabled("b").await);
        // Not marked fresh, so the next read retries.
        assert!(cache.is_enabled("b").await);
        assert_eq!(store.list_all_calls(), 2);

        store.set_unavailable(false);
        assert!(!cache.is_enabled("b").await);
    }

    #[tokio::test]
    async fn test_snapshot_contains_every_known_key() {
        let store = Arc::new(InMemoryFeatureToggleStore::with_entries(&[
            ("a", true),
            ("b", false),
        ]));
        let cache = cache_over(&store, DEFAULT_CACHE_TTL);

        let snapshot = cache.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("b"), Some(&false));
    }

    #[tokio::test]
    async fn test_concurrent_stale_reads_all_answer() {
        let store = Arc::new(InMemoryFeatureToggleStore::with_entries(&[("b", false)]));
        let cache = Arc::new(cache_over(&store, DEFAULT_CACHE_TTL));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.is_enabled("b").await })
            })
            .collect();

        for handle in handles {
            assert!(!handle.await.unwrap());
        }
        assert!(store.list_all_calls() >= 1);
    }

    #[tokio::test]
    async fn test_read_racing_invalidation_answers_from_store() {
        let inner = Arc::new(InMemoryFeatureToggleStore::with_entries(&[
            ("a", true),
            ("b", false),
        ]));
        let (store, release) = HeldStore::new(inner.clone());
        let cache = Arc::new(FeatureToggleCache::new(
            store.clone() as Arc<dyn FeatureToggleStore>,
            DEFAULT_CACHE_TTL,
        ));

        let reader = tokio::spawn({
            let cache = cache.clone();
            async move { cache.is_enabled("b").await }
        });

        // The reader has fetched {a: true, b: false} and is parked in the store.
        store.reading.notified().await;
        inner.update_enabled("a", false).await.unwrap();
        cache.invalidate().await;
        release.send(()).unwrap();

        assert!(!reader.await.unwrap());

        // The pre-invalidation fetch was dropped in favour of a second read.
        assert!(!cache.is_enabled("a").await);
        assert_eq!(inner.list_all_calls(), 2);
    }

    #[tokio::test]
    async fn test_superseded_refresh_is_not_installed() {
        let inner = Arc::new(InMemoryFeatureToggleStore::with_entries(&[("a", true)]));
        let (store, release) = HeldStore::new(inner.clone());
        let cache = Arc::new(FeatureToggleCache::new(
            store.clone() as Arc<dyn FeatureToggleStore>,
            DEFAULT_CACHE_TTL,
        ));

        let refresh = tokio::spawn({
            let cache = cache.clone();
            async move { cache.force_refresh().await }
        });

        store.reading.notified().await;
        cache.invalidate().await;
        release.send(()).unwrap();

        assert!(!refresh.await.unwrap());
        let status = cache.status().await;
        assert_eq!(status.entries, 0);
        assert!(status.last_refresh_age.is_none());
    }
}
