//! In-memory position reader for tests and local runs.

use async_trait::async_trait;
use tokio::sync::RwLock;

use synthwatch_common::error::AppError;
use synthwatch_common::types::Position;

use crate::PositionReader;

/// `PositionReader` backed by an in-memory vector.
///
/// Insertion order is preserved so scans observe the same iteration order
/// a real ledger enumeration would supply.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    positions: RwLock<Vec<Position>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a position, or replace the existing one for the same owner
    /// in place (keeping its slot in the iteration order).
    pub async fn upsert(&self, position: Position) {
        let mut positions = self.positions.write().await;
        match positions.iter_mut().find(|p| p.owner == position.owner) {
            Some(existing) => *existing = position,
            None => positions.push(position),
        }
    }

    pub async fn remove(&self, owner: &str) {
        self.positions.write().await.retain(|p| p.owner != owner);
    }
}

#[async_trait]
impl PositionReader for MemoryLedger {
    async fn position(&self, owner: &str) -> Result<Position, AppError> {
        self.positions
            .read()
            .await
            .iter()
            .find(|p| p.owner == owner)
            .cloned()
            .ok_or_else(|| AppError::PositionNotFound(owner.to_string()))
    }

    async fn list_positions(&self) -> Result<Vec<Position>, AppError> {
        Ok(self.positions.read().await.clone())
    }
}
