//! Process-local price cache.
//!
//! Holds the latest collateral and synthetic USD prices; written only by
//! the refresher, read by every risk calculation. The two prices live in
//! independent cells: a reader may observe a collateral price and a
//! synthetic price written at slightly different instants. That absence of
//! cross-field atomicity is deliberate; callers must not assume a single
//! global snapshot.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;

use synthwatch_common::error::AppError;
use synthwatch_common::types::PriceSnapshot;

#[derive(Debug, Clone, Copy)]
struct PricePoint {
    price: Decimal,
    updated_at: Instant,
}

/// Latest-value cache for the two oracle prices.
pub struct PriceCache {
    collateral_usd: RwLock<Option<PricePoint>>,
    synthetic_usd: RwLock<Option<PricePoint>>,
    /// Maximum age before a read fails `PriceUnavailable`. `None` disables
    /// the staleness check.
    max_age: Option<Duration>,
}

impl PriceCache {
    pub fn new(max_age: Option<Duration>) -> Self {
        Self {
            collateral_usd: RwLock::new(None),
            synthetic_usd: RwLock::new(None),
            max_age,
        }
    }

    /// Build from the `PRICE_MAX_AGE_SECS` config convention: 0 disables.
    pub fn from_max_age_secs(secs: u64) -> Self {
        let max_age = (secs > 0).then(|| Duration::from_secs(secs));
        Self::new(max_age)
    }

    /// Latest collateral-asset price in USD.
    pub fn collateral_price(&self) -> Result<Decimal, AppError> {
        Self::read_cell(&self.collateral_usd, "collateral", self.max_age)
    }

    /// Latest synthetic-asset reference price in USD.
    pub fn synthetic_price(&self) -> Result<Decimal, AppError> {
        Self::read_cell(&self.synthetic_usd, "synthetic", self.max_age)
    }

    /// Both prices, read back-to-back (two independent cell reads).
    pub fn snapshot(&self) -> Result<PriceSnapshot, AppError> {
        Ok(PriceSnapshot {
            collateral_usd: self.collateral_price()?,
            synthetic_usd: self.synthetic_price()?,
        })
    }

    /// Store a freshly fetched pair. Non-positive values are rejected,
    /// keeping the last good price in place.
    pub fn store(&self, snapshot: PriceSnapshot) {
        Self::store_cell(&self.collateral_usd, "collateral", snapshot.collateral_usd);
        Self::store_cell(&self.synthetic_usd, "synthetic", snapshot.synthetic_usd);
    }

    fn read_cell(
        cell: &RwLock<Option<PricePoint>>,
        label: &str,
        max_age: Option<Duration>,
    ) -> Result<Decimal, AppError> {
        let guard = cell
            .read()
            .map_err(|_| AppError::Internal(format!("{label} price cell lock poisoned")))?;

        let point = guard
            .as_ref()
            .ok_or_else(|| AppError::PriceUnavailable(format!("no {label} price observed yet")))?;

        if let Some(max_age) = max_age
            && point.updated_at.elapsed() >= max_age
        {
            return Err(AppError::PriceUnavailable(format!(
                "{label} price is older than {}s",
                max_age.as_secs()
            )));
        }

        Ok(point.price)
    }

    fn store_cell(cell: &RwLock<Option<PricePoint>>, label: &str, price: Decimal) {
        if price <= Decimal::ZERO {
            tracing::warn!(%price, label, "Rejected non-positive price, keeping last good value");
            return;
        }

        match cell.write() {
            Ok(mut guard) => {
                *guard = Some(PricePoint {
                    price,
                    updated_at: Instant::now(),
                });
            }
            Err(_) => tracing::warn!(label, "Price cell lock poisoned, dropping update"),
        }
    }
}
