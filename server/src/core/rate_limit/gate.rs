//! Rate Limit Gate Middleware
//!
//! Tower middleware layer orchestrating identity resolution, tier lookup
//! and admission per request. Every path ends in an explicit allow (with
//! informational quota headers) or a 429 rejection; nothing from the gate
//! escapes as a fault to the request layer.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::IntoResponse;
use futures::future::BoxFuture;
use hyper::Request;
use tower::{Layer, Service};
use tracing::debug;

use super::config::RateLimitConfig;
use super::error::RateLimitError;
use super::identity::{resolve_identity, CallerIdentity};
use super::limiter::{Decision, RateLimitCore, RateLimiterStats};
use super::tier::TierStore;
use crate::core::app::ServerMode;
use crate::types;

/// Shared gate state: one per server, owned by `AppState`, handed to the
/// layer by reference. Never a hidden process-wide singleton.
pub struct Gate {
	config: RateLimitConfig,
	limiter: RateLimitCore,
	tiers: TierStore,
	mode: ServerMode,
}

impl Gate {
	pub fn new(config: RateLimitConfig, tiers: TierStore, mode: ServerMode) -> Self {
		let limiter = RateLimitCore::new(config.counter_capacity);
		Self { config, limiter, tiers, mode }
	}

	/// Resolve, classify and admit one request
	async fn check(&self, identity: CallerIdentity) -> Result<AllowInfo, RateLimitError> {
		let tier = self.tiers.tier_for(&identity).await;
		let limit = self.config.limit_for(tier);

		match self.limiter.admit(&identity, &limit, types::now()) {
			Decision::Allow { remaining } => Ok(AllowInfo {
				tier: tier.name(),
				limit: limit.requests_per_window,
				remaining,
			}),
			Decision::Deny { retry_after } => {
				debug!("Rate limited {} ({} tier), retry after {}s", identity, tier, retry_after);
				Err(RateLimitError::LimitExceeded { tier: tier.name(), retry_after })
			}
		}
	}

	pub fn stats(&self) -> RateLimiterStats {
		self.limiter.stats()
	}
}

/// Quota metadata attached to admitted responses
struct AllowInfo {
	tier: &'static str,
	limit: u32,
	remaining: u32,
}

/// Rate limit gate layer
#[derive(Clone)]
pub struct RateLimitGateLayer {
	gate: Arc<Gate>,
}

impl RateLimitGateLayer {
	pub fn new(gate: Arc<Gate>) -> Self {
		Self { gate }
	}
}

impl<S> Layer<S> for RateLimitGateLayer {
	type Service = RateLimitGateService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RateLimitGateService { inner, gate: self.gate.clone() }
	}
}

/// Rate limit gate service
#[derive(Clone)]
pub struct RateLimitGateService<S> {
	inner: S,
	gate: Arc<Gate>,
}

impl<S> Service<Request<Body>> for RateLimitGateService<S>
where
	S: Service<Request<Body>, Response = axum::response::Response> + Clone + Send + 'static,
	S::Future: Send + 'static,
{
	type Response = S::Response;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let gate = self.gate.clone();
		let mut inner = self.inner.clone();

		let identity = resolve_identity(&req, &gate.mode);

		Box::pin(async move {
			let info = match gate.check(identity).await {
				Ok(info) => info,
				// Rejected: downstream routing is never invoked
				Err(error) => return Ok(error.into_response()),
			};

			let mut response = inner.call(req).await?;

			let headers = response.headers_mut();
			if let Ok(val) = info.remaining.to_string().parse() {
				headers.insert("X-RateLimit-Remaining", val);
			}
			if let Ok(val) = info.limit.to_string().parse() {
				headers.insert("X-RateLimit-Limit", val);
			}
			if let Ok(val) = info.tier.parse() {
				headers.insert("X-RateLimit-Tier", val);
			}

			Ok(response)
		})
	}
}

// vim: ts=4
