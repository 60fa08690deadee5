//! HTTP middleware components.

pub mod auth;
pub mod features;
pub mod logging;
pub mod metrics;
pub mod trace_id;

pub use auth::{require_admin, ADMIN_KEY_HEADER};
pub use features::{feature_disabled_response, require_feature, FeatureGate};
pub use metrics::{init_metrics, metrics_handler, metrics_middleware};
pub use trace_id::{trace_id, RequestId, REQUEST_ID_HEADER};
