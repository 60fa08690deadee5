//! Feature toggle repository.
//!
//! PostgreSQL implementation of [`FeatureToggleStore`].

use domain::models::{FeatureToggle, NewFeatureToggle};
use domain::services::{FeatureToggleStore, StoreError};
use sqlx::PgPool;

use crate::entities::FeatureToggleEntity;
use crate::metrics::QueryTimer;

/// SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Repository for the feature_toggles table.
#[derive(Clone)]
pub struct FeatureToggleRepository {
    pool: PgPool,
}

impl FeatureToggleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Translate a sqlx error into the store's error taxonomy.
pub fn map_sqlx_error(err: sqlx::Error, feature_key: &str) -> StoreError {
    match err {
        sqlx::Error::Database(ref db_err)
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
        {
            StoreError::Duplicate(feature_key.to_string())
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
        other => StoreError::Backend(other.to_string()),
    }
}

#[async_trait::async_trait]
impl FeatureToggleStore for FeatureToggleRepository {
    async fn ping(&self) -> Result<(), StoreError> {
        let timer = QueryTimer::new("ping_feature_toggles");
        let result = sqlx::query("SELECT 1 FROM feature_toggles LIMIT 1")
            .fetch_optional(&self.pool)
            .await;
        timer
            .finish(result)
            .map(|_| ())
            .map_err(|e| map_sqlx_error(e, ""))
    }

    async fn list_all(&self) -> Result<Vec<FeatureToggle>, StoreError> {
        let timer = QueryTimer::new("list_feature_toggles");
        let result = sqlx::query_as::<_, FeatureToggleEntity>(
            r#"
            SELECT id, feature_key, feature_name, description, is_enabled, category, created_at, updated_at
            FROM feature_toggles
            ORDER BY category, feature_name
            "#,
        )
        .fetch_all(&self.pool)
        .await;

        timer
            .finish(result)
            .map(|rows| rows.into_iter().map(Into::into).collect())
            .map_err(|e| map_sqlx_error(e, ""))
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<FeatureToggle>, StoreError> {
        let timer = QueryTimer::new("list_feature_toggles_by_category");
        let result = sqlx::query_as::<_, FeatureToggleEntity>(
            r#"
            SELECT id, feature_key, feature_name, description, is_enabled, category, created_at, updated_at
            FROM feature_toggles
            WHERE category = $1
            ORDER BY feature_name
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await;

        timer
            .finish(result)
            .map(|rows| rows.into_iter().map(Into::into).collect())
            .map_err(|e| map_sqlx_error(e, ""))
    }

    async fn find_by_key(&self, feature_key: &str) -> Result<Option<FeatureToggle>, StoreError> {
        let timer = QueryTimer::new("find_feature_toggle");
        let result = sqlx::query_as::<_, FeatureToggleEntity>(
            r#"
            SELECT id, feature_key, feature_name, description, is_enabled, category, created_at, updated_at
            FROM feature_toggles
            WHERE feature_key = $1
            "#,
        )
        .bind(feature_key)
        .fetch_optional(&self.pool)
        .await;

        timer
            .finish(result)
            .map(|row| row.map(Into::into))
            .map_err(|e| map_sqlx_error(e, feature_key))
    }

    async fn insert(&self, toggle: &NewFeatureToggle) -> Result<FeatureToggle, StoreError> {
        let timer = QueryTimer::new("insert_feature_toggle");
        let result = sqlx::query_as::<_, FeatureToggleEntity>(
            r#"
            INSERT INTO feature_toggles (feature_key, feature_name, description, is_enabled, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, feature_key, feature_name, description, is_enabled, category, created_at, updated_at
            "#,
        )
        .bind(&toggle.feature_key)
        .bind(&toggle.feature_name)
        .bind(&toggle.description)
        .bind(toggle.is_enabled)
        .bind(toggle.category_or_default())
        .fetch_one(&self.pool)
        .await;

        timer
            .finish(result)
            .map(Into::into)
            .map_err(|e| map_sqlx_error(e, &toggle.feature_key))
    }

    async fn update_enabled(
        &self,
        feature_key: &str,
        is_enabled: bool,
    ) -> Result<Option<FeatureToggle>, StoreError> {
        let timer = QueryTimer::new("update_feature_toggle");
        let result = sqlx::query_as::<_, FeatureToggleEntity>(
            r#"
            UPDATE feature_toggles
            SET is_enabled = $2, updated_at = NOW()
            WHERE feature_key = $1
            RETURNING id, feature_key, feature_name, description, is_enabled, category, created_at, updated_at
            "#,
        )
        .bind(feature_key)
        .bind(is_enabled)
        .fetch_optional(&self.pool)
        .await;

        timer
            .finish(result)
            .map(|row| row.map(Into::into))
            .map_err(|e| map_sqlx_error(e, feature_key))
    }

    async fn delete_by_key(&self, feature_key: &str) -> Result<bool, StoreError> {
        let timer = QueryTimer::new("delete_feature_toggle");
        let result = sqlx::query("DELETE FROM feature_toggles WHERE feature_key = $1")
            .bind(feature_key)
            .execute(&self.pool)
            .await;

        timer
            .finish(result)
            .map(|done| done.rows_affected() > 0)
            .map_err(|e| map_sqlx_error(e, feature_key))
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, StoreError> {
        let timer = QueryTimer::new("list_feature_categories");
        let result = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM feature_toggles ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await;

        timer.finish(result).map_err(|e| map_sqlx_error(e, ""))
    }
}
