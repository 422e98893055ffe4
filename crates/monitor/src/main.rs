//! SynthWatch position monitor binary entrypoint.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use synthwatch_common::config::AppConfig;
use synthwatch_common::db;
use synthwatch_common::redis_pool::create_redis_pool;
use synthwatch_common::types::{PriceSnapshot, RiskParameters};

use synthwatch_engine::{RiskEngine, RiskParamsStore};
use synthwatch_ledger::pg::PgLedger;
use synthwatch_ledger::watcher::LedgerWatcher;
use synthwatch_monitor::monitor::PositionMonitor;
use synthwatch_notifier::{LogNotifier, NotificationSink, WebhookNotifier};
use synthwatch_oracle::PriceSource;
use synthwatch_oracle::cache::PriceCache;
use synthwatch_oracle::fixed::FixedPriceSource;
use synthwatch_oracle::http::HttpPriceSource;
use synthwatch_oracle::refresher::PriceRefresher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "synthwatch_monitor=info,synthwatch_engine=info,synthwatch_ledger=info".into()
            }),
        )
        .json()
        .init();

    tracing::info!("SynthWatch monitor starting...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Connect to the ledger mirror
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;

    // Run migrations
    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    // Redis is optional: without it the monitor loses only duplicate-alert
    // suppression
    let redis = match create_redis_pool(&config.redis_url).await {
        Ok(conn) => Some(conn),
        Err(e) => {
            tracing::warn!(error = %e, "Redis unavailable, alert cooldown disabled");
            None
        }
    };

    // Price cache + refresher task
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

    // Risk engine over the Postgres mirror
    let engine = RiskEngine::new(
        Arc::new(PgLedger::new(pool.clone())),
        cache,
        Arc::new(RiskParamsStore::new(RiskParameters::default())),
    );

    // Alert sink
    let notifier: Arc<dyn NotificationSink> = match &config.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
        None => Arc::new(LogNotifier::new()),
    };

    // Ledger change feed
    let (change_tx, change_rx) = mpsc::channel(256);
    let watcher = LedgerWatcher::new(pool, config.ledger_poll_interval_ms);
    tokio::spawn(watcher.run(change_tx));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = PositionMonitor::new(
        engine,
        notifier,
        redis,
        config.alert_cooldown_secs,
        config.risk_scan_interval_ms,
    );

    let mut monitor_task = tokio::spawn(monitor.run(change_rx, shutdown_rx));

    tokio::select! {
        result = &mut monitor_task => {
            result??;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
            let _ = shutdown_tx.send(true);
            // Wait for any in-flight scan to finish before tearing down
            monitor_task.await??;
        }
    }

    tracing::info!("SynthWatch monitor stopped.");
    Ok(())
}
