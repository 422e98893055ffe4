//! Fixed-price oracle source.
//!
//! Serves configured constants, used when no oracle endpoint is set (the
//! source system shipped with mock prices for exactly this case).

use async_trait::async_trait;

use synthwatch_common::error::AppError;
use synthwatch_common::types::PriceSnapshot;

use crate::PriceSource;

pub struct FixedPriceSource {
    snapshot: PriceSnapshot,
}

impl FixedPriceSource {
    pub fn new(snapshot: PriceSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl PriceSource for FixedPriceSource {
    async fn fetch(&self) -> Result<PriceSnapshot, AppError> {
        Ok(self.snapshot)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}
