//! Liquidation amount and protocol fee math.
//!
//! Liquidation follows a fixed 50% partial policy: every liquidation
//! event repays exactly half the outstanding synthetic debt, regardless
//! of how far the position has fallen. The liquidator's bonus comes out
//! of the owner's remaining collateral at the configured penalty rate.

use rust_decimal::Decimal;

use synthwatch_common::error::AppError;
use synthwatch_common::types::{LiquidationAmounts, PriceSnapshot, RiskParameters, UserHealthFactor};

/// Compute seize/repay amounts for a position already flagged
/// liquidatable. Callers must gate on `is_liquidatable` first; this
/// function only does the arithmetic.
pub fn liquidation_amounts(
    health: &UserHealthFactor,
    prices: PriceSnapshot,
    params: &RiskParameters,
) -> Result<LiquidationAmounts, AppError> {
    // Half the outstanding debt, always.
    let synthetics_to_repay = health
        .synthetics_amount
        .checked_mul(Decimal::new(5, 1))
        .ok_or_else(|| AppError::ComputationInvalid("repay amount overflowed".to_string()))?;

    let synthetics_to_repay_usd = synthetics_to_repay
        .checked_mul(prices.synthetic_usd)
        .ok_or_else(|| AppError::ComputationInvalid("repay USD value overflowed".to_string()))?;

    // Collateral equivalent of the repaid debt at current prices.
    let base_collateral_to_seize = synthetics_to_repay_usd
        .checked_div(prices.collateral_usd)
        .ok_or_else(|| {
            AppError::ComputationInvalid(format!(
                "seize amount undefined for collateral price {}",
                prices.collateral_usd
            ))
        })?;

    let liquidation_bonus = base_collateral_to_seize
        .checked_mul(params.liquidation_penalty)
        .ok_or_else(|| AppError::ComputationInvalid("liquidation bonus overflowed".to_string()))?;

    let collateral_to_seize = base_collateral_to_seize
        .checked_add(liquidation_bonus)
        .ok_or_else(|| AppError::ComputationInvalid("seize amount overflowed".to_string()))?;

    let collateral_to_seize_usd = collateral_to_seize
        .checked_mul(prices.collateral_usd)
        .ok_or_else(|| AppError::ComputationInvalid("seize USD value overflowed".to_string()))?;

    Ok(LiquidationAmounts {
        synthetics_to_repay,
        collateral_to_seize,
        synthetics_to_repay_usd,
        collateral_to_seize_usd,
        liquidation_bonus,
    })
}

/// Protocol fee on a transaction USD amount. Pure, no I/O.
pub fn protocol_fee(transaction_amount_usd: Decimal, fee_rate: Decimal) -> Decimal {
    transaction_amount_usd * fee_rate
}
