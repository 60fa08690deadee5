//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use domain::services::CacheStatus;
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
    pub feature_cache: FeatureCacheHealth,
}

/// Database health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Feature toggle cache status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FeatureCacheHealth {
    pub entries: usize,
    pub last_refresh_age_secs: Option<u64>,
    pub ttl_secs: u64,
    pub stale: bool,
}

impl From<CacheStatus> for FeatureCacheHealth {
    fn from(status: CacheStatus) -> Self {
        Self {
            entries: status.entries,
            last_refresh_age_secs: status.last_refresh_age.map(|age| age.as_secs()),
            ttl_secs: status.ttl.as_secs(),
            stale: status.is_stale(),
        }
    }
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check endpoint.
///
/// Reports database reachability and the state of the feature toggle cache.
/// An unreachable database degrades the service (503) but feature checks keep
/// answering from the cache.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = std::time::Instant::now();
    let db_connected = state.features.ping_store().await.is_ok();
    let latency_ms = start.elapsed().as_millis() as u64;

    let response = HealthResponse {
        status: if db_connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            connected: db_connected,
            latency_ms: db_connected.then_some(latency_ms),
        },
        feature_cache: state.features.cache_status().await.into(),
    };

    let status = if db_connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 OK if the database is reachable.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    if state.features.ping_store().await.is_ok() {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_feature_cache_health_from_fresh_status() {
        let health: FeatureCacheHealth = CacheStatus {
            entries: 10,
            last_refresh_age: Some(Duration::from_secs(42)),
            ttl: Duration::from_secs(300),
        }
        .into();

        assert_eq!(health.entries, 10);
        assert_eq!(health.last_refresh_age_secs, Some(42));
        assert_eq!(health.ttl_secs, 300);
        assert!(!health.stale);
    }

    #[test]
    fn test_feature_cache_health_never_loaded() {
        let health: FeatureCacheHealth = CacheStatus {
            entries: 0,
            last_refresh_age: None,
            ttl: Duration::from_secs(300),
        }
        .into();

        assert_eq!(health.last_refresh_age_secs, None);
        assert!(health.stale);
    }
}
