//! Ledger change watcher.
//!
//! The source system delivers per-account change callbacks; the mirror
//! equivalent is a cursor poll over the `updated_at` column. Each row that
//! moved past the cursor becomes a `PositionChange` message for the
//! position monitor.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use synthwatch_common::error::AppError;
use synthwatch_common::types::PositionChange;

/// Polls the ledger mirror for position changes and forwards them.
pub struct LedgerWatcher {
    pool: PgPool,
    poll_interval: Duration,
    /// Newest `updated_at` already forwarded. Starts at process start, so
    /// only changes made after boot are treated as events.
    cursor: DateTime<Utc>,
}

impl LedgerWatcher {
    pub fn new(pool: PgPool, poll_interval_ms: u64) -> Self {
        Self {
            pool,
            poll_interval: Duration::from_millis(poll_interval_ms),
            cursor: Utc::now(),
        }
    }

    /// Run the poll loop until the receiving side of `tx` closes.
    ///
    /// Closing the receiver is the unsubscribe path; it is idempotent. A
    /// watcher whose receiver is already gone stops on its next send.
    pub async fn run(mut self, tx: mpsc::Sender<PositionChange>) -> anyhow::Result<()> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Ledger watcher started"
        );

        loop {
            ticker.tick().await;

            let changes = match self.poll_changes().await {
                Ok(changes) => changes,
                Err(e) => {
                    tracing::warn!(error = %e, "Ledger change poll failed, will retry");
                    continue;
                }
            };

            for change in changes {
                if tx.send(change).await.is_err() {
                    tracing::info!("Change receiver closed, stopping ledger watcher");
                    return Ok(());
                }
            }
        }
    }

    /// Fetch rows newer than the cursor and advance it.
    pub async fn poll_changes(&mut self) -> Result<Vec<PositionChange>, AppError> {
        let rows: Vec<(String, Decimal, Decimal, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT owner_address, deposited_collateral, minted_synthetic, updated_at
            FROM positions
            WHERE updated_at > $1
            ORDER BY updated_at
            "#,
        )
        .bind(self.cursor)
        .fetch_all(&self.pool)
        .await?;

        if let Some((_, _, _, newest)) = rows.last() {
            self.cursor = *newest;
        }

        Ok(rows
            .into_iter()
            .map(
                |(owner, deposited_collateral, minted_synthetic, observed_at)| PositionChange {
                    owner,
                    deposited_collateral,
                    minted_synthetic,
                    observed_at,
                },
            )
            .collect())
    }
}
