//! Collateralization ratio and health factor math.
//!
//! Pure functions over `Decimal`; no I/O. The engine orchestrator feeds
//! them with a position, a price snapshot, and the current parameters.

use rust_decimal::Decimal;

use synthwatch_common::error::AppError;
use synthwatch_common::types::{Position, PriceSnapshot, RiskParameters, UserHealthFactor};

/// Sentinel ratio for debt-free positions. `Decimal` has no infinity; a
/// position with zero synthetic debt is maximally healthy and can never
/// be liquidated.
pub const MAX_RATIO: Decimal = Decimal::MAX;

/// Collateralization ratio: collateral USD value / synthetic USD value.
///
/// Returns `MAX_RATIO` when the synthetic value is zero.
pub fn collateral_ratio(
    collateral_value_usd: Decimal,
    synthetics_value_usd: Decimal,
) -> Result<Decimal, AppError> {
    if synthetics_value_usd <= Decimal::ZERO {
        return Ok(MAX_RATIO);
    }

    collateral_value_usd
        .checked_div(synthetics_value_usd)
        .ok_or_else(|| AppError::ComputationInvalid("collateral ratio overflowed".to_string()))
}

/// Health factor: current ratio / liquidation threshold. Exactly 1.0 at
/// the liquidation boundary; `MAX_RATIO` passes through untouched.
pub fn health_factor(
    current_ratio: Decimal,
    liquidation_threshold: Decimal,
) -> Result<Decimal, AppError> {
    if current_ratio == MAX_RATIO {
        return Ok(MAX_RATIO);
    }

    current_ratio
        .checked_div(liquidation_threshold)
        .ok_or_else(|| {
            AppError::ComputationInvalid(format!(
                "health factor undefined for liquidation threshold {liquidation_threshold}"
            ))
        })
}

/// Strict comparison: a ratio exactly at the threshold is NOT liquidatable.
pub fn is_liquidatable(current_ratio: Decimal, liquidation_threshold: Decimal) -> bool {
    current_ratio < liquidation_threshold
}

/// Evaluate one position against a price snapshot and the current
/// parameters, producing the full derived health value.
pub fn evaluate(
    position: &Position,
    prices: PriceSnapshot,
    params: &RiskParameters,
) -> Result<UserHealthFactor, AppError> {
    let collateral_value_usd = position
        .deposited_collateral
        .checked_mul(prices.collateral_usd)
        .ok_or_else(|| AppError::ComputationInvalid("collateral USD value overflowed".to_string()))?;

    let synthetics_value_usd = position
        .minted_synthetic
        .checked_mul(prices.synthetic_usd)
        .ok_or_else(|| AppError::ComputationInvalid("synthetic USD value overflowed".to_string()))?;

    let current_ratio = collateral_ratio(collateral_value_usd, synthetics_value_usd)?;
    let health = health_factor(current_ratio, params.liquidation_threshold)?;

    Ok(UserHealthFactor {
        owner: position.owner.clone(),
        collateral_amount: position.deposited_collateral,
        synthetics_amount: position.minted_synthetic,
        collateral_value_usd,
        synthetics_value_usd,
        current_ratio,
        health_factor: health,
        is_liquidatable: is_liquidatable(current_ratio, params.liquidation_threshold),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_position(collateral: &str, synthetic: &str) -> Position {
        Position {
            owner: "owner_a".to_string(),
            deposited_collateral: collateral.parse().unwrap(),
            minted_synthetic: synthetic.parse().unwrap(),
        }
    }

    fn prices(collateral: i64, synthetic: i64) -> PriceSnapshot {
        PriceSnapshot {
            collateral_usd: Decimal::from(collateral),
            synthetic_usd: Decimal::from(synthetic),
        }
    }

    // ── ratio ──

    #[test]
    fn test_zero_debt_ratio_is_max_regardless_of_prices() {
        for (pc, ps) in [(1, 1), (150, 800), (1_000_000, 3)] {
            let health =
                evaluate(&make_position("10", "0"), prices(pc, ps), &RiskParameters::default())
                    .unwrap();
            assert_eq!(health.current_ratio, MAX_RATIO);
            assert_eq!(health.health_factor, MAX_RATIO);
            assert!(!health.is_liquidatable);
        }
    }

    #[test]
    fn test_ratio_division() {
        assert_eq!(
            collateral_ratio(Decimal::from(1500), Decimal::from(800)).unwrap(),
            "1.875".parse::<Decimal>().unwrap()
        );
    }

    // ── boundary ──

    #[test]
    fn test_exact_threshold_is_not_liquidatable() {
        // 10 collateral @ 100 = 1000 USD; 1 synthetic @ 800 = 800 USD;
        // ratio 1.25 == threshold → health factor exactly 1, not liquidatable
        let health = evaluate(
            &make_position("10", "1"),
            prices(100, 800),
            &RiskParameters::default(),
        )
        .unwrap();
        assert_eq!(health.current_ratio, Decimal::new(125, 2));
        assert_eq!(health.health_factor, Decimal::ONE);
        assert!(!health.is_liquidatable);
    }

    #[test]
    fn test_just_below_threshold_is_liquidatable() {
        let threshold = Decimal::new(125, 2);
        assert!(is_liquidatable("1.2499".parse().unwrap(), threshold));
        assert!(!is_liquidatable("1.25".parse().unwrap(), threshold));
        assert!(!is_liquidatable("1.2501".parse().unwrap(), threshold));
    }

    // ── worked scenarios ──

    #[test]
    fn test_healthy_position_scenario() {
        let health = evaluate(
            &make_position("10", "1"),
            prices(150, 800),
            &RiskParameters::default(),
        )
        .unwrap();

        assert_eq!(health.collateral_value_usd, Decimal::from(1500));
        assert_eq!(health.synthetics_value_usd, Decimal::from(800));
        assert_eq!(health.current_ratio, "1.875".parse::<Decimal>().unwrap());
        assert_eq!(health.health_factor, "1.5".parse::<Decimal>().unwrap());
        assert!(!health.is_liquidatable);
    }

    #[test]
    fn test_undercollateralized_position_scenario() {
        let health = evaluate(
            &make_position("5", "1"),
            prices(150, 800),
            &RiskParameters::default(),
        )
        .unwrap();

        assert_eq!(health.collateral_value_usd, Decimal::from(750));
        assert_eq!(health.current_ratio, "0.9375".parse::<Decimal>().unwrap());
        assert!(health.is_liquidatable);
    }

    // ── liquidatability equivalence ──

    #[test]
    fn test_liquidatable_iff_collateral_value_below_scaled_debt() {
        let params = RiskParameters::default();
        let cases = [("5", "1"), ("10", "1"), ("10", "6"), ("100", "18"), ("3", "2")];

        for (collateral, synthetic) in cases {
            let position = make_position(collateral, synthetic);
            let snapshot = prices(150, 800);
            let health = evaluate(&position, snapshot, &params).unwrap();

            let expected = position.deposited_collateral * snapshot.collateral_usd
                < position.minted_synthetic * snapshot.synthetic_usd * params.liquidation_threshold;
            assert_eq!(health.is_liquidatable, expected, "case {collateral}/{synthetic}");
        }
    }

    #[test]
    fn test_health_factor_fails_on_zero_threshold() {
        let err = health_factor(Decimal::ONE, Decimal::ZERO).unwrap_err();
        assert!(matches!(err, AppError::ComputationInvalid(_)));
    }
}
