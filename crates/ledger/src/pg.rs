//! Postgres-backed position reader.
//!
//! Reads the `positions` mirror table maintained by the (out-of-scope)
//! ledger ingestion pipeline. Strictly read-only: no INSERT/UPDATE paths
//! exist in this crate outside of tests.

use async_trait::async_trait;
use sqlx::PgPool;

use synthwatch_common::error::AppError;
use synthwatch_common::types::Position;

use crate::PositionReader;

/// `PositionReader` over the Postgres ledger mirror.
#[derive(Debug, Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PositionReader for PgLedger {
    async fn position(&self, owner: &str) -> Result<Position, AppError> {
        let row: Option<Position> = sqlx::query_as(
            r#"
            SELECT owner_address, deposited_collateral, minted_synthetic
            FROM positions
            WHERE owner_address = $1
            "#,
        )
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::PositionNotFound(owner.to_string()))
    }

    async fn list_positions(&self) -> Result<Vec<Position>, AppError> {
        let rows: Vec<Position> = sqlx::query_as(
            r#"
            SELECT owner_address, deposited_collateral, minted_synthetic
            FROM positions
            ORDER BY owner_address
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
