//! Risk engine orchestrator.
//!
//! Ties the ledger reader, price cache, and parameter store to the pure
//! math in `health` and `liquidation`. Single-position operations
//! propagate collaborator failures unchanged (fail closed); the bulk scan
//! isolates per-position failures so one bad read cannot hide the rest of
//! the population.

use std::sync::Arc;

use rust_decimal::Decimal;

use synthwatch_common::error::AppError;
use synthwatch_common::types::{
    LiquidationAmounts, MintEligibility, RiskParameters, RiskParametersUpdate, UserHealthFactor,
};
use synthwatch_ledger::PositionReader;
use synthwatch_oracle::cache::PriceCache;

use crate::health;
use crate::liquidation;
use crate::params::RiskParamsStore;

/// Advisory risk computation layer. Never moves funds.
#[derive(Clone)]
pub struct RiskEngine {
    ledger: Arc<dyn PositionReader>,
    prices: Arc<PriceCache>,
    params: Arc<RiskParamsStore>,
}

impl RiskEngine {
    pub fn new(
        ledger: Arc<dyn PositionReader>,
        prices: Arc<PriceCache>,
        params: Arc<RiskParamsStore>,
    ) -> Self {
        Self {
            ledger,
            prices,
            params,
        }
    }

    /// Current risk parameters, copied out.
    pub fn risk_parameters(&self) -> RiskParameters {
        self.params.current()
    }

    /// Merge a partial admin update; returns the merged result.
    pub fn update_risk_parameters(&self, update: RiskParametersUpdate) -> RiskParameters {
        self.params.apply(update)
    }

    /// Compute the derived health of one owner's position.
    ///
    /// The position read and the two price reads happen within this call
    /// but are not a single atomic snapshot; callers must tolerate values
    /// observed at slightly different instants.
    pub async fn user_health_factor(&self, owner: &str) -> Result<UserHealthFactor, AppError> {
        let position = self.ledger.position(owner).await?;
        let snapshot = self.prices.snapshot()?;
        health::evaluate(&position, snapshot, &self.params.current())
    }

    /// Check whether `owner` may mint `additional_amount` more synthetic
    /// units under the minimum collateral ratio (stricter than the
    /// liquidation threshold; the two must not be conflated).
    ///
    /// Fails closed: a read failure is an error, never "eligible".
    pub async fn mint_eligibility(
        &self,
        owner: &str,
        additional_amount: Decimal,
    ) -> Result<MintEligibility, AppError> {
        let position = self.ledger.position(owner).await?;
        let prices = self.prices.snapshot()?;
        let params = self.params.current();

        let collateral_value_usd = position
            .deposited_collateral
            .checked_mul(prices.collateral_usd)
            .ok_or_else(|| {
                AppError::ComputationInvalid("collateral USD value overflowed".to_string())
            })?;

        let current_synthetics_value_usd = position
            .minted_synthetic
            .checked_mul(prices.synthetic_usd)
            .ok_or_else(|| {
                AppError::ComputationInvalid("synthetic USD value overflowed".to_string())
            })?;

        let additional_value_usd = additional_amount
            .checked_mul(prices.synthetic_usd)
            .ok_or_else(|| {
                AppError::ComputationInvalid("mint USD value overflowed".to_string())
            })?;

        let total_synthetics_value_usd = current_synthetics_value_usd
            .checked_add(additional_value_usd)
            .ok_or_else(|| {
                AppError::ComputationInvalid("total synthetic USD value overflowed".to_string())
            })?;

        let required_collateral_value_usd = total_synthetics_value_usd
            .checked_mul(params.minimum_collateral_ratio)
            .ok_or_else(|| {
                AppError::ComputationInvalid("required collateral value overflowed".to_string())
            })?;

        let required_collateral_amount = required_collateral_value_usd
            .checked_div(prices.collateral_usd)
            .ok_or_else(|| {
                AppError::ComputationInvalid(format!(
                    "required collateral undefined for collateral price {}",
                    prices.collateral_usd
                ))
            })?;

        let additional_collateral_needed =
            (required_collateral_amount - position.deposited_collateral).max(Decimal::ZERO);

        let can_mint = collateral_value_usd >= required_collateral_value_usd;

        Ok(MintEligibility {
            can_mint,
            required_collateral: additional_collateral_needed,
            reason: (!can_mint)
                .then(|| "Insufficient collateral for the requested mint amount".to_string()),
        })
    }

    /// Scan every known position and return the liquidatable ones, in the
    /// ledger's iteration order.
    ///
    /// A failed evaluation of a single position is logged and skipped; a
    /// failed listing aborts the scan.
    pub async fn find_liquidatable(&self) -> Result<Vec<UserHealthFactor>, AppError> {
        let positions = self.ledger.list_positions().await?;
        let mut liquidatable = Vec::new();

        for position in &positions {
            // Prices and parameters are re-read per position; an admin
            // update landing mid-scan may evaluate later positions
            // against newer values.
            let evaluated = self
                .prices
                .snapshot()
                .and_then(|snapshot| health::evaluate(position, snapshot, &self.params.current()));

            match evaluated {
                Ok(health) if health.is_liquidatable => liquidatable.push(health),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        owner = %position.owner,
                        error = %e,
                        "Skipping position in liquidation scan"
                    );
                }
            }
        }

        Ok(liquidatable)
    }

    /// Seize/repay amounts for one owner under the 50% partial policy.
    ///
    /// Returns `Ok(None)` when the position is not liquidatable at
    /// computation time (an expected outcome, not a failure).
    pub async fn liquidation_amounts(
        &self,
        owner: &str,
    ) -> Result<Option<LiquidationAmounts>, AppError> {
        let health = self.user_health_factor(owner).await?;
        if !health.is_liquidatable {
            return Ok(None);
        }

        let snapshot = self.prices.snapshot()?;
        let amounts = liquidation::liquidation_amounts(&health, snapshot, &self.params.current())?;
        Ok(Some(amounts))
    }

    /// Protocol fee on a transaction USD amount.
    pub fn protocol_fee(&self, transaction_amount_usd: Decimal) -> Decimal {
        liquidation::protocol_fee(
            transaction_amount_usd,
            self.params.current().protocol_fee_rate,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthwatch_common::types::{Position, PriceSnapshot};
    use synthwatch_ledger::memory::MemoryLedger;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    async fn engine_with(
        positions: &[(&str, &str, &str)],
        collateral_price: i64,
        synthetic_price: i64,
    ) -> RiskEngine {
        let ledger = MemoryLedger::new();
        for (owner, collateral, synthetic) in positions {
            ledger
                .upsert(Position {
                    owner: owner.to_string(),
                    deposited_collateral: decimal(collateral),
                    minted_synthetic: decimal(synthetic),
                })
                .await;
        }

        let cache = PriceCache::new(None);
        cache.store(PriceSnapshot {
            collateral_usd: Decimal::from(collateral_price),
            synthetic_usd: Decimal::from(synthetic_price),
        });

        RiskEngine::new(
            Arc::new(ledger),
            Arc::new(cache),
            Arc::new(RiskParamsStore::default()),
        )
    }

    #[tokio::test]
    async fn test_healthy_position_health_factor() {
        let engine = engine_with(&[("alice", "10", "1")], 150, 800).await;
        let health = engine.user_health_factor("alice").await.unwrap();

        assert_eq!(health.collateral_value_usd, Decimal::from(1500));
        assert_eq!(health.synthetics_value_usd, Decimal::from(800));
        assert_eq!(health.current_ratio, decimal("1.875"));
        assert_eq!(health.health_factor, decimal("1.5"));
        assert!(!health.is_liquidatable);
    }

    #[tokio::test]
    async fn test_zero_debt_position_never_liquidatable() {
        let engine = engine_with(&[("alice", "10", "0")], 150, 800).await;
        let health = engine.user_health_factor("alice").await.unwrap();

        assert_eq!(health.current_ratio, health::MAX_RATIO);
        assert!(!health.is_liquidatable);
        assert_eq!(engine.liquidation_amounts("alice").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_owner_propagates_not_found() {
        let engine = engine_with(&[], 150, 800).await;

        let err = engine.user_health_factor("nobody").await.unwrap_err();
        assert!(matches!(err, AppError::PositionNotFound(_)));

        // Mint eligibility fails closed on the same read failure
        let err = engine
            .mint_eligibility("nobody", Decimal::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PositionNotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_prices_fail_closed() {
        let ledger = MemoryLedger::new();
        ledger
            .upsert(Position {
                owner: "alice".to_string(),
                deposited_collateral: Decimal::from(10),
                minted_synthetic: Decimal::ONE,
            })
            .await;

        let engine = RiskEngine::new(
            Arc::new(ledger),
            Arc::new(PriceCache::new(None)),
            Arc::new(RiskParamsStore::default()),
        );

        let err = engine.user_health_factor("alice").await.unwrap_err();
        assert!(matches!(err, AppError::PriceUnavailable(_)));

        let err = engine.mint_eligibility("alice", Decimal::ONE).await.unwrap_err();
        assert!(matches!(err, AppError::PriceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_mint_eligibility_with_room_to_spare() {
        let engine = engine_with(&[("alice", "10", "0")], 150, 800).await;
        let result = engine.mint_eligibility("alice", Decimal::ONE).await.unwrap();

        // required value = 800 × 1.5 = 1200; collateral value 1500 covers it
        assert!(result.can_mint);
        assert_eq!(result.required_collateral, Decimal::ZERO);
        assert!(result.reason.is_none());
    }

    #[tokio::test]
    async fn test_mint_eligibility_denied_with_shortfall() {
        let engine = engine_with(&[("alice", "5", "0")], 150, 800).await;
        let result = engine.mint_eligibility("alice", Decimal::ONE).await.unwrap();

        // required amount = 1200 / 150 = 8; holding 5 → 3 more needed
        assert!(!result.can_mint);
        assert_eq!(result.required_collateral, Decimal::from(3));
        assert_eq!(
            result.reason.as_deref(),
            Some("Insufficient collateral for the requested mint amount")
        );
    }

    #[tokio::test]
    async fn test_find_liquidatable_filters_and_preserves_order() {
        let engine = engine_with(
            &[
                ("debt_free", "10", "0"),
                ("under_b", "5", "1"),
                ("healthy", "10", "1"),
                ("under_a", "4", "1"),
            ],
            150,
            800,
        )
        .await;

        let liquidatable = engine.find_liquidatable().await.unwrap();
        let owners: Vec<&str> = liquidatable.iter().map(|h| h.owner.as_str()).collect();
        // Reader order, not re-sorted by severity
        assert_eq!(owners, vec!["under_b", "under_a"]);
    }

    #[tokio::test]
    async fn test_liquidation_amounts_for_underwater_position() {
        let engine = engine_with(&[("alice", "5", "1")], 150, 800).await;
        let amounts = engine.liquidation_amounts("alice").await.unwrap().unwrap();

        assert_eq!(amounts.synthetics_to_repay, decimal("0.5"));
        assert_eq!(amounts.synthetics_to_repay_usd, Decimal::from(400));
        assert_eq!(amounts.collateral_to_seize.round_dp(3), decimal("2.933"));
        assert_eq!(amounts.liquidation_bonus.round_dp(4), decimal("0.2667"));
    }

    #[tokio::test]
    async fn test_liquidation_not_applicable_for_healthy_position() {
        let engine = engine_with(&[("alice", "10", "1")], 150, 800).await;
        assert_eq!(engine.liquidation_amounts("alice").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_parameter_update_changes_subsequent_results_only() {
        // ratio = 128 × 1 / (1 × 100) = 1.28: healthy at threshold 1.25
        let engine = engine_with(&[("alice", "128", "1")], 1, 100).await;

        let before = engine.user_health_factor("alice").await.unwrap();
        assert!(!before.is_liquidatable);

        engine.update_risk_parameters(RiskParametersUpdate {
            liquidation_threshold: Some(decimal("1.3")),
            ..Default::default()
        });

        let after = engine.user_health_factor("alice").await.unwrap();
        assert!(after.is_liquidatable);

        // The previously returned value is untouched
        assert!(!before.is_liquidatable);
        assert_eq!(before.current_ratio, decimal("1.28"));
    }

    #[tokio::test]
    async fn test_protocol_fee_uses_current_rate() {
        let engine = engine_with(&[], 150, 800).await;
        assert_eq!(engine.protocol_fee(Decimal::from(1000)), Decimal::from(5));

        engine.update_risk_parameters(RiskParametersUpdate {
            protocol_fee_rate: Some(decimal("0.01")),
            ..Default::default()
        });
        assert_eq!(engine.protocol_fee(Decimal::from(1000)), Decimal::from(10));
    }
}
