use rust_decimal::Decimal;
use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string (ledger mirror)
    pub database_url: String,

    /// Redis connection string (alert cooldown)
    pub redis_url: String,

    /// Price oracle HTTP endpoint; when unset, fixed fallback prices are used
    pub oracle_url: Option<String>,

    /// Feed identifier for the collateral asset (e.g. "SOL/USD")
    pub collateral_feed: String,

    /// Feed identifier for the synthetic asset's reference (e.g. "TSLA/USD")
    pub synthetic_feed: String,

    /// Fallback collateral price in USD, used without an oracle endpoint
    pub fallback_collateral_price: Decimal,

    /// Fallback synthetic reference price in USD, used without an oracle endpoint
    pub fallback_synthetic_price: Decimal,

    /// Price refresh interval in milliseconds (default: 60000 = 1 min)
    pub price_refresh_interval_ms: u64,

    /// Maximum age of a cached price in seconds before reads fail
    /// `PriceUnavailable` (default: 300; 0 disables the staleness check)
    pub price_max_age_secs: u64,

    /// Interval-triggered liquidation scan period in milliseconds
    /// (default: 300000 = 5 min)
    pub risk_scan_interval_ms: u64,

    /// Ledger mirror change-poll interval in milliseconds (default: 2000)
    pub ledger_poll_interval_ms: u64,

    /// Cooldown between liquidation alerts for the same owner, in seconds
    /// (default: 300)
    pub alert_cooldown_secs: u64,

    /// Webhook URL for alert delivery; when unset, alerts are only logged
    pub webhook_url: Option<String>,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,

    /// API server listen port (default: 3000)
    pub api_port: u16,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            oracle_url: std::env::var("ORACLE_URL").ok(),
            collateral_feed: std::env::var("COLLATERAL_FEED")
                .unwrap_or_else(|_| "SOL/USD".to_string()),
            synthetic_feed: std::env::var("SYNTHETIC_FEED")
                .unwrap_or_else(|_| "TSLA/USD".to_string()),
            fallback_collateral_price: std::env::var("FALLBACK_COLLATERAL_PRICE")
                .unwrap_or_else(|_| "150".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("FALLBACK_COLLATERAL_PRICE must be a decimal"))?,
            fallback_synthetic_price: std::env::var("FALLBACK_SYNTHETIC_PRICE")
                .unwrap_or_else(|_| "800".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("FALLBACK_SYNTHETIC_PRICE must be a decimal"))?,
            price_refresh_interval_ms: std::env::var("PRICE_REFRESH_INTERVAL_MS")
                .unwrap_or_else(|_| "60000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PRICE_REFRESH_INTERVAL_MS must be a valid u64"))?,
            price_max_age_secs: std::env::var("PRICE_MAX_AGE_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PRICE_MAX_AGE_SECS must be a valid u64"))?,
            risk_scan_interval_ms: std::env::var("RISK_SCAN_INTERVAL_MS")
                .unwrap_or_else(|_| "300000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("RISK_SCAN_INTERVAL_MS must be a valid u64"))?,
            ledger_poll_interval_ms: std::env::var("LEDGER_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("LEDGER_POLL_INTERVAL_MS must be a valid u64"))?,
            alert_cooldown_secs: std::env::var("ALERT_COOLDOWN_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("ALERT_COOLDOWN_SECS must be a valid u64"))?,
            webhook_url: std::env::var("WEBHOOK_URL").ok(),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("API_PORT must be a valid u16"))?,
        })
    }
}
