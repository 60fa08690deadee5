use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use domain::services::{
    DefaultFeature, FeatureToggleService, FeatureToggleStore, DEFAULT_FEATURES,
};
use persistence::repositories::FeatureToggleRepository;
use sqlx::PgPool;
use tracing::{info, warn};

use teammove_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging
    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!("Starting TeamMove API v{}", env!("CARGO_PKG_VERSION"));

    // The pool connects lazily so the API comes up while the database is down
    let pool = persistence::db::create_pool(&config.database.pool_settings())?;

    info!("Running database migrations...");
    match persistence::db::run_migrations(&pool).await {
        Ok(()) => info!("Migrations completed"),
        Err(e) => warn!(error = %e, "Database migrations failed, continuing without them"),
    }

    spawn_pool_metrics(pool.clone());

    let store: Arc<dyn FeatureToggleStore> = Arc::new(FeatureToggleRepository::new(pool));
    let features = Arc::new(FeatureToggleService::new(
        store,
        config.features.cache_ttl(),
    ));

    let defaults: &[DefaultFeature] = if config.features.seed_defaults {
        DEFAULT_FEATURES
    } else {
        &[]
    };
    if !features.initialize(defaults).await.store_reachable {
        warn!("Database unreachable at startup; feature checks fail open until it recovers");
    }

    if config.security.admin_api_key.is_empty() {
        warn!("security.admin_api_key is not set; admin routes will reject every request");
    }

    // Build application
    let addr = config.socket_addr()?;
    let app = app::create_app(config, features);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Records connection pool gauges every few seconds.
fn spawn_pool_metrics(pool: PgPool) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(10));
        loop {
            interval.tick().await;
            persistence::metrics::record_pool_metrics(&pool);
        }
    });
}
