//! Position monitor loop.
//!
//! Two independent triggers feed the risk engine:
//! - a ledger change event for one owner (handled on its own spawned
//!   task, so one owner's event never blocks another's), and
//! - a fixed-interval scan over the whole population (runs to completion
//!   inside its select branch, so ticks never overlap).
//!
//! Results go to the notification sink; liquidation alerts pass through
//! the per-owner cooldown first.

use std::sync::Arc;
use std::time::Duration;

use redis::aio::ConnectionManager;
use rust_decimal::Decimal;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use synthwatch_common::types::{PositionChange, UserHealthFactor};
use synthwatch_engine::RiskEngine;
use synthwatch_notifier::{NotificationSink, RiskAlert};

use crate::cooldown::AlertCooldown;

#[derive(Clone)]
pub struct PositionMonitor {
    engine: RiskEngine,
    notifier: Arc<dyn NotificationSink>,
    /// Without Redis the monitor still runs; only duplicate-alert
    /// suppression is lost.
    redis: Option<ConnectionManager>,
    cooldown: AlertCooldown,
    scan_interval: Duration,
}

/// Warning band: positions with `1.0 <= health_factor < 1.2` get a
/// near-liquidation notice.
fn in_warning_band(health_factor: Decimal) -> bool {
    health_factor >= Decimal::ONE && health_factor < Decimal::new(12, 1)
}

impl PositionMonitor {
    pub fn new(
        engine: RiskEngine,
        notifier: Arc<dyn NotificationSink>,
        redis: Option<ConnectionManager>,
        cooldown_secs: u64,
        scan_interval_ms: u64,
    ) -> Self {
        Self {
            engine,
            notifier,
            redis,
            cooldown: AlertCooldown::new(cooldown_secs),
            scan_interval: Duration::from_millis(scan_interval_ms),
        }
    }

    /// Run both trigger paths until the shutdown signal flips or the
    /// change channel closes. The in-flight select branch always finishes
    /// before the loop exits, so a shutdown never interrupts a scan
    /// midway.
    pub async fn run(
        self,
        mut changes: mpsc::Receiver<PositionChange>,
        mut shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<()> {
        let mut ticker = tokio::time::interval(self.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; consume it so the initial
        // scan waits a full period, matching the source's timer semantics.
        ticker.tick().await;

        tracing::info!(
            scan_interval_ms = self.scan_interval.as_millis() as u64,
            "Position monitor started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_scan().await;
                }
                maybe_change = changes.recv() => match maybe_change {
                    Some(change) => {
                        let monitor = self.clone();
                        tokio::spawn(async move { monitor.handle_change(change).await });
                    }
                    None => {
                        tracing::info!("Change channel closed, stopping position monitor");
                        break;
                    }
                },
                _ = shutdown.changed() => {
                    tracing::info!("Shutdown signal received, stopping position monitor");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Event-triggered path: re-check one owner after a ledger change.
    pub async fn handle_change(&self, change: PositionChange) {
        let health = match self.engine.user_health_factor(&change.owner).await {
            Ok(health) => health,
            Err(e) => {
                tracing::warn!(
                    owner = %change.owner,
                    error = %e,
                    "Health check failed for changed position"
                );
                return;
            }
        };

        tracing::info!(
            owner = %health.owner,
            collateral_value_usd = %health.collateral_value_usd,
            synthetics_value_usd = %health.synthetics_value_usd,
            current_ratio = %health.current_ratio.round_dp(2),
            health_factor = %health.health_factor.round_dp(2),
            "Position health after ledger change"
        );

        if in_warning_band(health.health_factor) {
            self.notifier.deliver(RiskAlert::NearLiquidation {
                owner: health.owner.clone(),
                health_factor: health.health_factor,
            });
        }

        if health.is_liquidatable {
            self.propose_liquidation(health).await;
        }
    }

    /// Interval-triggered path: scan the whole population.
    pub async fn run_scan(&self) {
        tracing::info!("Performing periodic risk check");

        let liquidatable = match self.engine.find_liquidatable().await {
            Ok(list) => list,
            Err(e) => {
                tracing::error!(error = %e, "Periodic risk scan failed");
                return;
            }
        };

        if liquidatable.is_empty() {
            tracing::info!("No accounts eligible for liquidation");
            return;
        }

        tracing::info!(
            count = liquidatable.len(),
            "Found accounts eligible for liquidation"
        );

        for health in liquidatable {
            self.propose_liquidation(health).await;
        }
    }

    /// Compute amounts and emit a liquidation alert, gated by the
    /// per-owner cooldown.
    async fn propose_liquidation(&self, health: UserHealthFactor) {
        if !self.allow_alert(&health.owner).await {
            return;
        }

        match self.engine.liquidation_amounts(&health.owner).await {
            Ok(Some(amounts)) => {
                self.notifier.deliver(RiskAlert::LiquidationEligible {
                    owner: health.owner.clone(),
                    health,
                    amounts,
                });
            }
            // The position recovered between the flag and this computation
            Ok(None) => {
                tracing::debug!(owner = %health.owner, "Position no longer liquidatable, skipping alert");
            }
            Err(e) => {
                tracing::warn!(
                    owner = %health.owner,
                    error = %e,
                    "Liquidation amount computation failed"
                );
            }
        }
    }

    async fn allow_alert(&self, owner: &str) -> bool {
        let Some(redis) = &self.redis else {
            return true;
        };

        let mut conn = redis.clone();
        match self.cooldown.check_and_set(&mut conn, owner).await {
            Ok(allowed) => allowed,
            Err(e) => {
                // A cooldown outage must not hide a liquidation
                tracing::warn!(error = %e, owner, "Cooldown check failed, delivering alert anyway");
                true
            }
        }
    }
}
