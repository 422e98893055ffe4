//! Integration tests for API routes.
//!
//! Uses `tower::ServiceExt` to test Axum routes without a real HTTP
//! server, over the in-memory ledger and a primed price cache; no
//! database or oracle required.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use rust_decimal::Decimal;
use tower::ServiceExt;

use synthwatch_api::routes::create_router;
use synthwatch_api::state::AppState;
use synthwatch_common::config::AppConfig;
use synthwatch_common::types::{Position, PriceSnapshot};
use synthwatch_engine::{RiskEngine, RiskParamsStore};
use synthwatch_ledger::memory::MemoryLedger;
use synthwatch_oracle::cache::PriceCache;

// ============================================================
// Helpers
// ============================================================

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "unused".to_string(),
        redis_url: "redis://localhost:6379".to_string(),
        oracle_url: None,
        collateral_feed: "SOL/USD".to_string(),
        synthetic_feed: "TSLA/USD".to_string(),
        fallback_collateral_price: Decimal::from(150),
        fallback_synthetic_price: Decimal::from(800),
        price_refresh_interval_ms: 60_000,
        price_max_age_secs: 0,
        risk_scan_interval_ms: 300_000,
        ledger_poll_interval_ms: 2_000,
        alert_cooldown_secs: 300,
        webhook_url: None,
        db_max_connections: 5,
        api_port: 3000,
    }
}

async fn test_app(positions: &[(&str, &str, &str)], prime_prices: bool) -> Router {
    let ledger = MemoryLedger::new();
    for (owner, collateral, synthetic) in positions {
        ledger
            .upsert(Position {
                owner: owner.to_string(),
                deposited_collateral: collateral.parse().unwrap(),
                minted_synthetic: synthetic.parse().unwrap(),
            })
            .await;
    }

    let cache = PriceCache::new(None);
    if prime_prices {
        cache.store(PriceSnapshot {
            collateral_usd: Decimal::from(150),
            synthetic_usd: Decimal::from(800),
        });
    }

    let engine = RiskEngine::new(
        Arc::new(ledger),
        Arc::new(cache),
        Arc::new(RiskParamsStore::default()),
    );

    create_router(AppState::new(engine, test_config()))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

// ============================================================
// Routes
// ============================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(&[], true).await;
    let (status, body) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "synthwatch-api");
}

#[tokio::test]
async fn test_get_parameters_returns_defaults() {
    let app = test_app(&[], true).await;
    let (status, body) = get_json(app, "/api/risk/parameters").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["minimum_collateral_ratio"], "1.50");
    assert_eq!(body["liquidation_threshold"], "1.25");
    assert_eq!(body["liquidation_penalty"], "0.10");
    assert_eq!(body["protocol_fee_rate"], "0.005");
}

#[tokio::test]
async fn test_patch_parameters_merges_partial_update() {
    let app = test_app(&[], true).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/api/risk/parameters")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"liquidation_threshold": "1.3"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["liquidation_threshold"], "1.3");
    // Untouched fields survive the merge
    assert_eq!(body["minimum_collateral_ratio"], "1.50");

    let (_, current) = get_json(app, "/api/risk/parameters").await;
    assert_eq!(current["liquidation_threshold"], "1.3");
}

#[tokio::test]
async fn test_get_health_for_known_owner() {
    let app = test_app(&[("alice", "10", "1")], true).await;
    let (status, body) = get_json(app, "/api/risk/positions/alice/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["owner"], "alice");
    assert_eq!(body["current_ratio"], "1.875");
    assert_eq!(body["health_factor"], "1.5");
    assert_eq!(body["is_liquidatable"], false);
}

#[tokio::test]
async fn test_get_health_unknown_owner_is_404() {
    let app = test_app(&[], true).await;
    let (status, body) = get_json(app, "/api/risk/positions/ghost/health").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn test_get_health_without_prices_is_503() {
    let app = test_app(&[("alice", "10", "1")], false).await;
    let (status, _) = get_json(app, "/api/risk/positions/alice/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_mint_eligibility_query() {
    let app = test_app(&[("alice", "10", "0")], true).await;
    let (status, body) =
        get_json(app, "/api/risk/positions/alice/mint-eligibility?amount=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["can_mint"], true);
    assert_eq!(body["required_collateral"], "0");
    assert!(body.get("reason").is_none());
}

#[tokio::test]
async fn test_mint_eligibility_denied_carries_reason() {
    let app = test_app(&[("alice", "5", "0")], true).await;
    let (status, body) =
        get_json(app, "/api/risk/positions/alice/mint-eligibility?amount=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["can_mint"], false);
    assert_eq!(
        body["required_collateral"]
            .as_str()
            .unwrap()
            .parse::<Decimal>()
            .unwrap(),
        Decimal::from(3)
    );
    assert_eq!(
        body["reason"],
        "Insufficient collateral for the requested mint amount"
    );
}

#[tokio::test]
async fn test_liquidation_amounts_null_for_healthy_position() {
    let app = test_app(&[("alice", "10", "1")], true).await;
    let (status, body) = get_json(app, "/api/risk/positions/alice/liquidation").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
}

#[tokio::test]
async fn test_liquidation_amounts_for_underwater_position() {
    let app = test_app(&[("alice", "5", "1")], true).await;
    let (status, body) = get_json(app, "/api/risk/positions/alice/liquidation").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["synthetics_to_repay"], "0.5");
    assert_eq!(
        body["synthetics_to_repay_usd"]
            .as_str()
            .unwrap()
            .parse::<Decimal>()
            .unwrap(),
        Decimal::from(400)
    );
}

#[tokio::test]
async fn test_list_liquidatable() {
    let app = test_app(
        &[("healthy", "10", "1"), ("under", "5", "1"), ("debt_free", "1", "0")],
        true,
    )
    .await;
    let (status, body) = get_json(app, "/api/risk/liquidatable").await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["owner"], "under");
}
