//! Common validation utilities.

use validator::ValidationError;

/// Maximum length of a feature key.
pub const MAX_FEATURE_KEY_LENGTH: usize = 64;

/// Maximum length of a category label.
pub const MAX_CATEGORY_LENGTH: usize = 50;

lazy_static::lazy_static! {
    /// Feature keys are snake_case identifiers: `dark_mode`, `event_messaging`.
    pub static ref FEATURE_KEY_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-z][a-z0-9_]*$").unwrap();
}

/// Validates a feature key: 1-64 chars, lowercase letters, digits and
/// underscores, starting with a letter.
pub fn validate_feature_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() || key.len() > MAX_FEATURE_KEY_LENGTH {
        let mut err = ValidationError::new("feature_key_length");
        err.message = Some("Feature key must be 1-64 characters".into());
        return Err(err);
    }

    if !FEATURE_KEY_REGEX.is_match(key) {
        let mut err = ValidationError::new("feature_key_format");
        err.message = Some(
            "Feature key must start with a lowercase letter and contain only lowercase letters, digits and underscores"
                .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates a category label: 1-50 chars, not only whitespace.
pub fn validate_category(category: &str) -> Result<(), ValidationError> {
    if category.trim().is_empty() || category.len() > MAX_CATEGORY_LENGTH {
        let mut err = ValidationError::new("category_length");
        err.message = Some("Category must be 1-50 non-blank characters".into());
        return Err(err);
    }
    Ok(())
}
