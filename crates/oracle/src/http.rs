//! HTTP oracle source.
//!
//! Expects the endpoint to return a JSON object mapping feed identifiers
//! to USD prices, e.g. `{"SOL/USD": "150.25", "TSLA/USD": 801.5}`.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use synthwatch_common::error::AppError;
use synthwatch_common::types::PriceSnapshot;

use crate::PriceSource;

pub struct HttpPriceSource {
    client: reqwest::Client,
    url: String,
    collateral_feed: String,
    synthetic_feed: String,
}

impl HttpPriceSource {
    pub fn new(url: String, collateral_feed: String, synthetic_feed: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            collateral_feed,
            synthetic_feed,
        }
    }

    fn feed_price(
        prices: &HashMap<String, Decimal>,
        feed: &str,
    ) -> Result<Decimal, AppError> {
        prices.get(feed).copied().ok_or_else(|| {
            AppError::PriceUnavailable(format!("feed {feed} missing from oracle response"))
        })
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch(&self) -> Result<PriceSnapshot, AppError> {
        let prices: HashMap<String, Decimal> = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::PriceUnavailable(format!("oracle request failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::PriceUnavailable(format!("oracle returned {e}")))?
            .json()
            .await
            .map_err(|e| AppError::PriceUnavailable(format!("oracle response malformed: {e}")))?;

        Ok(PriceSnapshot {
            collateral_usd: Self::feed_price(&prices, &self.collateral_feed)?,
            synthetic_usd: Self::feed_price(&prices, &self.synthetic_feed)?,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
