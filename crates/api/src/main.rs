//! SynthWatch API server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use synthwatch_common::config::AppConfig;
use synthwatch_common::db::create_pool;
use synthwatch_common::types::{PriceSnapshot, RiskParameters};

use synthwatch_engine::{RiskEngine, RiskParamsStore};
use synthwatch_ledger::pg::PgLedger;
use synthwatch_oracle::PriceSource;
use synthwatch_oracle::cache::PriceCache;
use synthwatch_oracle::fixed::FixedPriceSource;
use synthwatch_oracle::http::HttpPriceSource;
use synthwatch_oracle::refresher::PriceRefresher;

use synthwatch_api::routes::create_router;
use synthwatch_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("synthwatch_api=debug,synthwatch_engine=debug,tower_http=debug")
        }))
        .init();

    tracing::info!("Starting SynthWatch API server...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Create database connection pool
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    tracing::info!("Database pool created");

    // Price cache + refresher task (the engine reads the cache on every call)
    let cache = Arc::new(PriceCache::from_max_age_secs(config.price_max_age_secs));
    let source: Arc<dyn PriceSource> = match &config.oracle_url {
        Some(url) => Arc::new(HttpPriceSource::new(
            url.clone(),
            config.collateral_feed.clone(),
            config.synthetic_feed.clone(),
        )),
        None => {
            tracing::warn!("ORACLE_URL not set, serving fixed fallback prices");
            Arc::new(FixedPriceSource::new(PriceSnapshot {
                collateral_usd: config.fallback_collateral_price,
                synthetic_usd: config.fallback_synthetic_price,
            }))
        }
    };
    let refresher = PriceRefresher::new(source, cache.clone(), config.price_refresh_interval_ms);
    tokio::spawn(refresher.run());

    // Risk engine over the Postgres ledger mirror
    let engine = RiskEngine::new(
        Arc::new(PgLedger::new(pool)),
        cache,
        Arc::new(RiskParamsStore::new(RiskParameters::default())),
    );

    // Build application state
    let port = config.api_port;
    let state = AppState::new(engine, config);

    // Build router
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
