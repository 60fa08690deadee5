//! Domain services for TeamMove.
//!
//! Services contain business logic that operates on domain models.

pub mod cache;
pub mod defaults;
pub mod feature_toggle;
pub mod memory_store;
pub mod store;

pub use cache::{CacheStatus, FeatureToggleCache, DEFAULT_CACHE_TTL};
pub use defaults::{DefaultFeature, DEFAULT_FEATURES};
pub use feature_toggle::{FeatureToggleService, InitializationReport};
pub use memory_store::InMemoryFeatureToggleStore;
pub use store::{FeatureToggleStore, StoreError};
