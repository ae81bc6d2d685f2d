//! Shared helpers for gate middleware integration tests
//!
//! Provides a scriptable credential-service adapter and a minimal router
//! with the rate limit gate layered on, so tests can drive the middleware
//! end-to-end without any upstream services.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::routing::get;
use axum::Router;
use http_body_util::BodyExt;
use hyper::Request;

use blockgate::core::rate_limit::{Gate, RateLimitConfig, RateLimitGateLayer, TierStore};
use blockgate::error::{BgResult, Error};
use blockgate::tier_adapter::{TierAdapter, TierInfo};
use blockgate::ServerMode;

/// Credential-service stand-in: fixed tier, toggleable failure, invocation
/// counting
pub struct MockTierAdapter {
	tier: &'static str,
	fail: AtomicBool,
	calls: AtomicUsize,
}

impl MockTierAdapter {
	pub fn returning(tier: &'static str) -> Arc<Self> {
		Arc::new(Self { tier, fail: AtomicBool::new(false), calls: AtomicUsize::new(0) })
	}

	pub fn failing() -> Arc<Self> {
		let adapter = Self::returning("free");
		adapter.fail.store(true, Ordering::SeqCst);
		adapter
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl TierAdapter for MockTierAdapter {
	async fn lookup_tier(&self, _api_key: &str) -> BgResult<TierInfo> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if self.fail.load(Ordering::SeqCst) {
			return Err(Error::Upstream("credential service unavailable".into()));
		}
		Ok(TierInfo { tier_name: self.tier.into(), expires_at: None })
	}
}

/// Adapter that never answers, for refresh-timeout tests
pub struct HangingTierAdapter;

impl HangingTierAdapter {
	pub fn new() -> Arc<Self> {
		Arc::new(Self)
	}
}

#[async_trait]
impl TierAdapter for HangingTierAdapter {
	async fn lookup_tier(&self, _api_key: &str) -> BgResult<TierInfo> {
		tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
		Ok(TierInfo { tier_name: "pro".into(), expires_at: None })
	}
}

/// Build a gated router around a trivial handler; the counter records how
/// many requests actually reached it.
pub fn gated_router(
	config: RateLimitConfig,
	adapter: Arc<MockTierAdapter>,
	mode: ServerMode,
) -> (Router, Arc<AtomicUsize>) {
	gated_router_with(config, adapter, mode)
}

/// Same as `gated_router`, for any adapter implementation
pub fn gated_router_with(
	config: RateLimitConfig,
	adapter: Arc<dyn TierAdapter>,
	mode: ServerMode,
) -> (Router, Arc<AtomicUsize>) {
	let tiers = TierStore::new(
		adapter,
		config.tier_cache_capacity,
		config.tier_cache_ttl,
		config.refresh_timeout,
	);
	let gate = Arc::new(Gate::new(config, tiers, mode));

	let handled = Arc::new(AtomicUsize::new(0));
	let counter = handled.clone();
	let router = Router::new()
		.route(
			"/ping",
			get(move || {
				let counter = counter.clone();
				async move {
					counter.fetch_add(1, Ordering::SeqCst);
					"pong"
				}
			}),
		)
		.layer(RateLimitGateLayer::new(gate));

	(router, handled)
}

/// GET /ping, optionally with an API key
pub fn ping_request(api_key: Option<&str>) -> Request<Body> {
	let mut builder = Request::builder().uri("/ping");
	if let Some(key) = api_key {
		builder = builder.header("authorization", format!("Bearer {}", key));
	}
	builder.body(Body::empty()).unwrap()
}

/// Collect a response body into JSON
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
	let bytes = response.into_body().collect().await.unwrap().to_bytes();
	serde_json::from_slice(&bytes).unwrap()
}

// vim: ts=4
