//! Rate Limiting Configuration
//!
//! Per-tier request budgets plus the sizing knobs for the counter table and
//! the tier cache. Loaded once at startup; validation failures are fatal.

use std::time::Duration;

use crate::error::{BgResult, Error};
use super::tier::Tier;

/// Fixed-window request budget for a single tier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierLimit {
	/// Requests admitted per window. Zero denies every request.
	pub requests_per_window: u32,
	/// Window length in seconds. Must be positive.
	pub window_secs: i64,
}

impl TierLimit {
	pub fn new(requests_per_window: u32, window_secs: i64) -> Self {
		Self { requests_per_window, window_secs }
	}
}

/// Main rate limit configuration
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
	/// Anonymous callers and keys without a paid plan
	pub free: TierLimit,
	/// Paid API keys
	pub pro: TierLimit,
	/// Contract customers
	pub enterprise: TierLimit,
	/// Maximum number of window counters to track (LRU eviction past this)
	pub counter_capacity: usize,
	/// Maximum number of cached tier assignments
	pub tier_cache_capacity: usize,
	/// How long a cached tier assignment stays fresh
	pub tier_cache_ttl: Duration,
	/// Upper bound on a single credential-service lookup
	pub refresh_timeout: Duration,
}

impl Default for RateLimitConfig {
	fn default() -> Self {
		Self {
			free: TierLimit::new(60, 60),
			pro: TierLimit::new(600, 60),
			enterprise: TierLimit::new(6000, 60),
			counter_capacity: 100_000,
			tier_cache_capacity: 10_000,
			tier_cache_ttl: Duration::from_secs(300),
			refresh_timeout: Duration::from_secs(3),
		}
	}
}

impl RateLimitConfig {
	/// Budget for the given tier
	pub fn limit_for(&self, tier: Tier) -> TierLimit {
		match tier {
			Tier::Free => self.free,
			Tier::Pro => self.pro,
			Tier::Enterprise => self.enterprise,
		}
	}

	/// Reject configurations with undefined admission behavior.
	///
	/// A zero request budget is a valid (deny-all) configuration; a
	/// non-positive window is not.
	pub fn validate(&self) -> BgResult<()> {
		for (name, limit) in [
			("free", &self.free),
			("pro", &self.pro),
			("enterprise", &self.enterprise),
		] {
			if limit.window_secs <= 0 {
				return Err(Error::Config(
					format!("tier '{}': window_secs must be positive, got {}", name, limit.window_secs).into(),
				));
			}
		}
		if self.counter_capacity == 0 {
			return Err(Error::Config("counter_capacity must be positive".into()));
		}
		if self.tier_cache_capacity == 0 {
			return Err(Error::Config("tier_cache_capacity must be positive".into()));
		}
		if self.refresh_timeout.is_zero() {
			return Err(Error::Config("refresh_timeout must be positive".into()));
		}
		Ok(())
	}
}


// vim: ts=4
