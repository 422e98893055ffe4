//! Position monitor: the orchestration layer that triggers risk engine
//! calculations from ledger change events and a fixed-interval scan, and
//! forwards results to the notification sink.

pub mod cooldown;
pub mod monitor;
