use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Protocol-wide risk constants, mutable through the admin surface.
///
/// Documented invariants (NOT enforced on update, see `RiskParamsStore`):
/// `minimum_collateral_ratio > liquidation_threshold > 1.0`,
/// `liquidation_penalty >= 0`, `0 <= protocol_fee_rate < 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskParameters {
    /// Collateral-USD / synthetic-USD ratio required to mint new units.
    pub minimum_collateral_ratio: Decimal,
    /// Ratio below which a position becomes liquidatable.
    pub liquidation_threshold: Decimal,
    /// Fractional bonus added to the collateral seized on liquidation.
    pub liquidation_penalty: Decimal,
    /// Fee rate applied to transaction USD amounts.
    pub protocol_fee_rate: Decimal,
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            minimum_collateral_ratio: Decimal::new(150, 2), // 1.50
            liquidation_threshold: Decimal::new(125, 2),    // 1.25
            liquidation_penalty: Decimal::new(10, 2),       // 0.10
            protocol_fee_rate: Decimal::new(5, 3),          // 0.005
        }
    }
}

/// Partial admin update; omitted fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RiskParametersUpdate {
    pub minimum_collateral_ratio: Option<Decimal>,
    pub liquidation_threshold: Option<Decimal>,
    pub liquidation_penalty: Option<Decimal>,
    pub protocol_fee_rate: Option<Decimal>,
}

/// One user's position as mirrored from the external ledger.
///
/// Owned by the ledger; the risk engine only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Position {
    #[sqlx(rename = "owner_address")]
    pub owner: String,
    pub deposited_collateral: Decimal,
    pub minted_synthetic: Decimal,
}

/// The two oracle prices read by every calculation, in USD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub collateral_usd: Decimal,
    pub synthetic_usd: Decimal,
}

/// Derived health of one position. A value, computed fresh on every call
/// from Position + PriceSnapshot + RiskParameters; never cached.
///
/// `Decimal` has no infinity, so a debt-free position carries
/// `current_ratio == health_factor == Decimal::MAX`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserHealthFactor {
    pub owner: String,
    pub collateral_amount: Decimal,
    pub synthetics_amount: Decimal,
    pub collateral_value_usd: Decimal,
    pub synthetics_value_usd: Decimal,
    pub current_ratio: Decimal,
    /// current_ratio / liquidation_threshold; < 1 means liquidatable.
    pub health_factor: Decimal,
    pub is_liquidatable: bool,
}

/// Advisory seize/repay amounts for one liquidation event.
///
/// The engine never moves funds; the settlement layer must re-verify the
/// position is still liquidatable before acting on these numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidationAmounts {
    pub synthetics_to_repay: Decimal,
    pub collateral_to_seize: Decimal,
    pub synthetics_to_repay_usd: Decimal,
    pub collateral_to_seize_usd: Decimal,
    pub liquidation_bonus: Decimal,
}

/// Result of a mint-eligibility check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintEligibility {
    pub can_mint: bool,
    /// Additional collateral the user would need to deposit, in collateral
    /// units. Zero when the mint is already covered.
    pub required_collateral: Decimal,
    /// Human-readable denial reason; set only when `can_mint` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A change observed on the ledger mirror, fed to the position monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionChange {
    pub owner: String,
    pub deposited_collateral: Decimal,
    pub minted_synthetic: Decimal,
    pub observed_at: DateTime<Utc>,
}

/// Alert severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Human-readable notification payload ready for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Short title (e.g., "Position Eligible for Liquidation")
    pub title: String,
    /// Detailed body message
    pub body: String,
    /// Alert severity
    pub severity: Severity,
    /// Additional metadata for channel-specific formatting
    pub metadata: serde_json::Value,
}
