//! Live risk parameter store.
//!
//! Replaces the source system's process-wide mutable singleton with an
//! injected store, so concurrent tests run with isolated parameter sets.
//! Every calculation reads the store again; values are never cached
//! across calls, and reads are not synchronized against a concurrent
//! admin update (an update landing mid-scan may split the sweep across
//! old and new values; accepted and documented).

use std::sync::RwLock;

use synthwatch_common::types::{RiskParameters, RiskParametersUpdate};

/// Injected store for the live `RiskParameters`.
#[derive(Debug, Default)]
pub struct RiskParamsStore {
    inner: RwLock<RiskParameters>,
}

impl RiskParamsStore {
    pub fn new(params: RiskParameters) -> Self {
        Self {
            inner: RwLock::new(params),
        }
    }

    /// Current parameters, copied out. Callers never observe later
    /// mutation through the returned value.
    pub fn current(&self) -> RiskParameters {
        *self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Merge a partial admin update into the live set and return the
    /// merged result. Unset fields are left unchanged.
    ///
    /// No bounds validation is performed: any numeric value is accepted,
    /// matching observed source behavior. The invariants documented on
    /// `RiskParameters` are the operator's responsibility.
    pub fn apply(&self, update: RiskParametersUpdate) -> RiskParameters {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(value) = update.minimum_collateral_ratio {
            guard.minimum_collateral_ratio = value;
        }
        if let Some(value) = update.liquidation_threshold {
            guard.liquidation_threshold = value;
        }
        if let Some(value) = update.liquidation_penalty {
            guard.liquidation_penalty = value;
        }
        if let Some(value) = update.protocol_fee_rate {
            guard.protocol_fee_rate = value;
        }

        let merged = *guard;
        drop(guard);

        tracing::info!(
            minimum_collateral_ratio = %merged.minimum_collateral_ratio,
            liquidation_threshold = %merged.liquidation_threshold,
            liquidation_penalty = %merged.liquidation_penalty,
            protocol_fee_rate = %merged.protocol_fee_rate,
            "Risk parameters updated"
        );

        merged
    }
}
