//! Feature toggle entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the feature_toggles table.
#[derive(Debug, Clone, FromRow)]
pub struct FeatureToggleEntity {
    pub id: Uuid,
    pub feature_key: String,
    pub feature_name: String,
    pub description: Option<String>,
    pub is_enabled: bool,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FeatureToggleEntity> for domain::models::FeatureToggle {
    fn from(entity: FeatureToggleEntity) -> Self {
        Self {
            id: entity.id,
            feature_key: entity.feature_key,
            feature_name: entity.feature_name,
            description: entity.description,
            is_enabled: entity.is_enabled,
            category: entity.category,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
