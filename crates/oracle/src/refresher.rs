//! Price refresher task.
//!
//! Fetches from the configured source on a fixed interval (default 1 min)
//! and writes the cache. Runs independently of the position monitor and
//! never reads position data. Fetch failures are logged and the loop
//! continues; the cache keeps serving the last good value until it goes
//! stale.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use synthwatch_common::error::AppError;

use crate::PriceSource;
use crate::cache::PriceCache;

pub struct PriceRefresher {
    source: Arc<dyn PriceSource>,
    cache: Arc<PriceCache>,
    refresh_interval: Duration,
}

impl PriceRefresher {
    pub fn new(source: Arc<dyn PriceSource>, cache: Arc<PriceCache>, interval_ms: u64) -> Self {
        Self {
            source,
            cache,
            refresh_interval: Duration::from_millis(interval_ms),
        }
    }

    /// Run the refresh loop indefinitely. The first fetch happens
    /// immediately so the cache is primed before the engine's first read.
    pub async fn run(self) -> anyhow::Result<()> {
        let mut ticker = tokio::time::interval(self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            source = self.source.name(),
            refresh_interval_ms = self.refresh_interval.as_millis() as u64,
            "Price refresher started"
        );

        loop {
            ticker.tick().await;

            if let Err(e) = self.refresh_once().await {
                tracing::warn!(error = %e, source = self.source.name(), "Price refresh failed");
            }
        }
    }

    /// One fetch-and-store round.
    pub async fn refresh_once(&self) -> Result<(), AppError> {
        let snapshot = self.source.fetch().await?;
        self.cache.store(snapshot);

        tracing::info!(
            collateral_usd = %snapshot.collateral_usd,
            synthetic_usd = %snapshot.synthetic_usd,
            "Updated prices"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use synthwatch_common::types::PriceSnapshot;

    use crate::fixed::FixedPriceSource;

    #[tokio::test]
    async fn test_refresh_once_primes_cache() {
        let source = Arc::new(FixedPriceSource::new(PriceSnapshot {
            collateral_usd: Decimal::from(150),
            synthetic_usd: Decimal::from(800),
        }));
        let cache = Arc::new(PriceCache::new(None));
        let refresher = PriceRefresher::new(source, cache.clone(), 60_000);

        assert!(cache.snapshot().is_err());
        refresher.refresh_once().await.unwrap();

        let snap = cache.snapshot().unwrap();
        assert_eq!(snap.collateral_usd, Decimal::from(150));
        assert_eq!(snap.synthetic_usd, Decimal::from(800));
    }
}
