//! Price feed plumbing: the oracle source contract, the process-local
//! price cache the risk engine reads, and the refresher task that ties
//! them together on a fixed interval.

pub mod cache;
pub mod fixed;
pub mod http;
pub mod refresher;

use async_trait::async_trait;

use synthwatch_common::error::AppError;
use synthwatch_common::types::PriceSnapshot;

/// Contract for an external price oracle.
///
/// Implementations must return strictly positive prices or fail with
/// `AppError::PriceUnavailable`.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the current collateral and synthetic reference prices in USD.
    async fn fetch(&self) -> Result<PriceSnapshot, AppError>;

    /// Human-readable name for this source (e.g., "http", "fixed").
    fn name(&self) -> &'static str;
}
