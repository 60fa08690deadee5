//! HTTP route handlers.

pub mod admin_features;
pub mod features;
pub mod health;
