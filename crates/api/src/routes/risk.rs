//! Risk engine routes: parameters, per-position health, mint
//! eligibility, and liquidation candidates/amounts.

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;

use synthwatch_common::error::AppError;
use synthwatch_common::types::{
    LiquidationAmounts, MintEligibility, RiskParameters, RiskParametersUpdate, UserHealthFactor,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/risk/parameters", get(get_parameters))
        .route("/api/risk/parameters", patch(update_parameters))
        .route("/api/risk/positions/{owner}/health", get(get_health))
        .route(
            "/api/risk/positions/{owner}/mint-eligibility",
            get(get_mint_eligibility),
        )
        .route(
            "/api/risk/positions/{owner}/liquidation",
            get(get_liquidation_amounts),
        )
        .route("/api/risk/liquidatable", get(list_liquidatable))
}

/// GET /api/risk/parameters — current risk parameters.
async fn get_parameters(State(state): State<AppState>) -> Json<RiskParameters> {
    Json(state.engine.risk_parameters())
}

/// PATCH /api/risk/parameters — merge a partial admin update and return
/// the merged result. Accepts any numeric values (no bounds validation,
/// see `RiskParamsStore`).
async fn update_parameters(
    State(state): State<AppState>,
    Json(update): Json<RiskParametersUpdate>,
) -> Json<RiskParameters> {
    Json(state.engine.update_risk_parameters(update))
}

/// GET /api/risk/positions/:owner/health — derived health of one position.
async fn get_health(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<UserHealthFactor>, AppError> {
    Ok(Json(state.engine.user_health_factor(&owner).await?))
}

#[derive(Debug, Deserialize)]
struct MintQuery {
    amount: Decimal,
}

/// GET /api/risk/positions/:owner/mint-eligibility?amount=D
async fn get_mint_eligibility(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Query(query): Query<MintQuery>,
) -> Result<Json<MintEligibility>, AppError> {
    Ok(Json(
        state.engine.mint_eligibility(&owner, query.amount).await?,
    ))
}

/// GET /api/risk/positions/:owner/liquidation — seize/repay amounts, or
/// `null` when the position is not liquidatable.
async fn get_liquidation_amounts(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<Option<LiquidationAmounts>>, AppError> {
    Ok(Json(state.engine.liquidation_amounts(&owner).await?))
}

/// GET /api/risk/liquidatable — every liquidatable position, in ledger order.
async fn list_liquidatable(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserHealthFactor>>, AppError> {
    Ok(Json(state.engine.find_liquidatable().await?))
}
