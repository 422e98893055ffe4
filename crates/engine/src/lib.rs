//! Risk engine for the synthetic asset protocol.
//!
//! Computes per-user health factors, gates minting against the minimum
//! collateral ratio, scans the position population for liquidation
//! candidates, and derives penalty-adjusted seize/repay amounts under the
//! fixed 50% partial-liquidation policy.
//!
//! All computation is pure decimal arithmetic over reads of three
//! collaborators: the position ledger, the price cache, and the injected
//! risk parameter store. The engine is advisory only; it never moves
//! funds and never retries a failed collaborator read.

pub mod engine;
pub mod health;
pub mod liquidation;
pub mod params;

pub use engine::RiskEngine;
pub use params::RiskParamsStore;
