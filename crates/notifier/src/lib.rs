//! Alert translation and delivery.
//!
//! The position monitor hands finished `RiskAlert` values to a
//! `NotificationSink`; delivery is fire-and-forget and must never block
//! the monitor's loop. Two sinks ship here: a tracing-backed logger and a
//! webhook POSTer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use synthwatch_common::types::{
    LiquidationAmounts, NotificationPayload, Severity, UserHealthFactor,
};

/// An alert produced by the position monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RiskAlert {
    /// Health factor is in the warning band [1.0, 1.2).
    NearLiquidation { owner: String, health_factor: Decimal },
    /// Position is liquidatable; carries the computed seize/repay amounts.
    LiquidationEligible {
        owner: String,
        health: UserHealthFactor,
        amounts: LiquidationAmounts,
    },
}

impl RiskAlert {
    pub fn owner(&self) -> &str {
        match self {
            RiskAlert::NearLiquidation { owner, .. } => owner,
            RiskAlert::LiquidationEligible { owner, .. } => owner,
        }
    }
}

/// Translate an alert into a human-readable notification payload.
pub fn payload_for(alert: &RiskAlert) -> NotificationPayload {
    match alert {
        RiskAlert::NearLiquidation {
            owner,
            health_factor,
        } => NotificationPayload {
            title: "Position Near Liquidation".to_string(),
            body: format!(
                "WARNING: position {} is at risk of liquidation (health factor {})",
                owner,
                health_factor.round_dp(4)
            ),
            severity: Severity::Warning,
            metadata: serde_json::json!({
                "owner": owner,
                "health_factor": health_factor,
            }),
        },
        RiskAlert::LiquidationEligible {
            owner,
            health,
            amounts,
        } => NotificationPayload {
            title: "⚠️ Position Eligible for Liquidation".to_string(),
            body: format!(
                "ALERT: position {} is eligible for liquidation! ratio {}, repay {} synthetic units, seize {} collateral units",
                owner,
                health.current_ratio.round_dp(4),
                amounts.synthetics_to_repay.round_dp(4),
                amounts.collateral_to_seize.round_dp(4)
            ),
            severity: Severity::Critical,
            metadata: serde_json::json!({
                "owner": owner,
                "health": health,
                "amounts": amounts,
            }),
        },
    }
}

/// Sink for finished alerts. Implementations must return promptly;
/// anything slow (network delivery) happens on a spawned task.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, alert: RiskAlert);
}

/// Sink that writes alerts to the tracing log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSink for LogNotifier {
    fn deliver(&self, alert: RiskAlert) {
        let payload = payload_for(&alert);
        match payload.severity {
            Severity::Critical | Severity::Warning => {
                tracing::warn!(owner = alert.owner(), title = %payload.title, "{}", payload.body)
            }
            Severity::Info => {
                tracing::info!(owner = alert.owner(), title = %payload.title, "{}", payload.body)
            }
        }
    }
}

/// Sink that POSTs alert payloads to a configured webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

impl NotificationSink for WebhookNotifier {
    fn deliver(&self, alert: RiskAlert) {
        let payload = payload_for(&alert);
        let alert_id = Uuid::new_v4();
        let client = self.client.clone();
        let url = self.url.clone();

        // Delivery happens off the caller's task; the monitor never waits.
        tokio::spawn(async move {
            let body = serde_json::json!({
                "alert_id": alert_id,
                "title": payload.title,
                "body": payload.body,
                "severity": payload.severity,
                "metadata": payload.metadata,
            });

            match client.post(&url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!(%alert_id, "Webhook alert delivered");
                }
                Ok(response) => {
                    tracing::warn!(%alert_id, status = %response.status(), "Webhook rejected alert");
                }
                Err(e) => {
                    tracing::warn!(%alert_id, error = %e, "Webhook delivery failed");
                }
            }
        });
    }
}
