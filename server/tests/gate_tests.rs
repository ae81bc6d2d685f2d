//! End-to-end tests for the rate limit gate middleware
//!
//! Drives the full identity -> tier -> admission pipeline through an axum
//! router, asserting on status codes, quota headers and the 429 payload.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::http::StatusCode;
use tower::ServiceExt;

use blockgate::core::rate_limit::{RateLimitConfig, TierLimit};
use blockgate::ServerMode;

use common::{body_json, gated_router, ping_request, MockTierAdapter};

fn small_config() -> RateLimitConfig {
	let mut config = RateLimitConfig::default();
	config.free = TierLimit::new(3, 3600);
	config.pro = TierLimit::new(10, 3600);
	config
}

#[tokio::test]
async fn test_allowed_request_carries_quota_headers() {
	let adapter = MockTierAdapter::returning("free");
	let (router, _) = gated_router(small_config(), adapter, ServerMode::Standalone);

	let response = router.oneshot(ping_request(None)).await.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(response.headers().get("X-RateLimit-Remaining").unwrap(), "2");
	assert_eq!(response.headers().get("X-RateLimit-Limit").unwrap(), "3");
	assert_eq!(response.headers().get("X-RateLimit-Tier").unwrap(), "free");
}

#[tokio::test]
async fn test_exhausted_budget_yields_429() {
	let adapter = MockTierAdapter::returning("free");
	let (router, _) = gated_router(small_config(), adapter.clone(), ServerMode::Standalone);

	for _ in 0..3 {
		let response = router.clone().oneshot(ping_request(None)).await.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
	}

	let response = router.clone().oneshot(ping_request(None)).await.unwrap();
	assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
	assert!(response.headers().contains_key("Retry-After"));

	let body = body_json(response).await;
	assert!(body["error"].is_string());
	let retry_after = body["retryAfter"].as_i64().unwrap();
	assert!(retry_after > 0 && retry_after <= 3600);

	// Anonymous traffic must never touch the credential service
	assert_eq!(adapter.calls(), 0);
}

#[tokio::test]
async fn test_denied_request_never_reaches_handler() {
	let adapter = MockTierAdapter::returning("free");
	let (router, handled) = gated_router(small_config(), adapter, ServerMode::Standalone);

	for _ in 0..5 {
		let _ = router.clone().oneshot(ping_request(None)).await.unwrap();
	}

	// 3 admitted, 2 rejected before routing
	assert_eq!(handled.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_api_key_uses_its_tier() {
	let adapter = MockTierAdapter::returning("pro");
	let (router, _) = gated_router(small_config(), adapter.clone(), ServerMode::Standalone);

	let response = router.clone().oneshot(ping_request(Some("abc123"))).await.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(response.headers().get("X-RateLimit-Tier").unwrap(), "pro");
	assert_eq!(response.headers().get("X-RateLimit-Remaining").unwrap(), "9");

	// Second request hits the tier cache
	let _ = router.clone().oneshot(ping_request(Some("abc123"))).await.unwrap();
	assert_eq!(adapter.calls(), 1);
}

#[tokio::test]
async fn test_credential_failure_degrades_to_free() {
	let adapter = MockTierAdapter::failing();
	let (router, _) = gated_router(small_config(), adapter, ServerMode::Standalone);

	let response = router.oneshot(ping_request(Some("abc123"))).await.unwrap();

	// Outage never turns into a request failure, just the Free budget
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(response.headers().get("X-RateLimit-Tier").unwrap(), "free");
}

#[tokio::test]
async fn test_distinct_keys_have_independent_budgets() {
	let adapter = MockTierAdapter::returning("free");
	let (router, _) = gated_router(small_config(), adapter, ServerMode::Standalone);

	for _ in 0..4 {
		let _ = router.clone().oneshot(ping_request(Some("key-a"))).await.unwrap();
	}
	let denied = router.clone().oneshot(ping_request(Some("key-a"))).await.unwrap();
	assert_eq!(denied.status(), StatusCode::TOO_MANY_REQUESTS);

	let fresh = router.clone().oneshot(ping_request(Some("key-b"))).await.unwrap();
	assert_eq!(fresh.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_zero_budget_tier_denies_everything() {
	let mut config = small_config();
	config.free = TierLimit::new(0, 3600);
	let adapter = MockTierAdapter::returning("free");
	let (router, handled) = gated_router(config, adapter, ServerMode::Standalone);

	let response = router.oneshot(ping_request(None)).await.unwrap();
	assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
	assert_eq!(handled.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_slow_credential_service_is_bounded() {
	// A hanging credential service must not stall admission: the refresh
	// timeout expires and the request proceeds on the Free tier.
	let mut config = small_config();
	config.refresh_timeout = Duration::from_millis(50);

	let adapter = common::HangingTierAdapter::new();
	let (router, _) = common::gated_router_with(config, adapter, ServerMode::Standalone);

	let response = router.oneshot(ping_request(Some("abc123"))).await.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(response.headers().get("X-RateLimit-Tier").unwrap(), "free");
}

// vim: ts=4
