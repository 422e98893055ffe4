//! Read-only access to the external ledger's position state.
//!
//! The ledger itself (on-chain account state in the source system) is an
//! external collaborator. This crate exposes the reader contract the risk
//! engine consumes, the Postgres mirror implementation, an in-memory
//! implementation for tests and local runs, and the change watcher that
//! feeds the position monitor.

pub mod memory;
pub mod pg;
pub mod watcher;

use async_trait::async_trait;

use synthwatch_common::error::AppError;
use synthwatch_common::types::Position;

/// Read-only contract of the external position ledger.
#[async_trait]
pub trait PositionReader: Send + Sync {
    /// Fetch one owner's position.
    ///
    /// Fails with `AppError::PositionNotFound` for unknown owners; never
    /// silently defaults to zero balances.
    async fn position(&self, owner: &str) -> Result<Position, AppError>;

    /// List every known position, in the ledger's own iteration order.
    async fn list_positions(&self) -> Result<Vec<Position>, AppError>;
}
