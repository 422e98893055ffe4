//! Shared application state for the Axum API server.

use synthwatch_common::config::AppConfig;
use synthwatch_engine::RiskEngine;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub engine: RiskEngine,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(engine: RiskEngine, config: AppConfig) -> Self {
        Self { engine, config }
    }
}
