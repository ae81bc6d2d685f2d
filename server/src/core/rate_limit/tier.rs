//! Tier Store
//!
//! Maps caller identities to quota tiers. API-key tiers come from the
//! external credential service through a bounded-TTL cache; anonymous
//! callers are always Free and never touch the service. Lookup failures
//! degrade to the stale cache entry (fail-open) or to Free when nothing is
//! cached, so a credential-service outage never turns into request denials.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::identity::CallerIdentity;
use crate::tier_adapter::TierAdapter;
use crate::types::{self, Timestamp};

/// Quota class a caller belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
	Free,
	Pro,
	Enterprise,
}

impl Tier {
	pub fn name(&self) -> &'static str {
		match self {
			Tier::Free => "free",
			Tier::Pro => "pro",
			Tier::Enterprise => "enterprise",
		}
	}

	/// Parse a tier name as reported by the credential service
	pub fn from_name(name: &str) -> Option<Tier> {
		match name.to_ascii_lowercase().as_str() {
			"free" => Some(Tier::Free),
			"pro" => Some(Tier::Pro),
			"enterprise" => Some(Tier::Enterprise),
			_ => None,
		}
	}
}

impl std::fmt::Display for Tier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

/// Cached tier resolution for one API key
#[derive(Clone, Copy, Debug)]
struct TierAssignment {
	tier: Tier,
	fetched_at: Timestamp,
}

/// TTL-cached view of the credential service's tier assignments
pub struct TierStore {
	adapter: Arc<dyn TierAdapter>,
	cache: RwLock<LruCache<Box<str>, TierAssignment>>,
	ttl_secs: i64,
	refresh_timeout: Duration,
}

impl TierStore {
	pub fn new(
		adapter: Arc<dyn TierAdapter>,
		capacity: usize,
		ttl: Duration,
		refresh_timeout: Duration,
	) -> Self {
		let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
		Self {
			adapter,
			cache: RwLock::new(LruCache::new(capacity)),
			ttl_secs: ttl.as_secs() as i64,
			refresh_timeout,
		}
	}

	/// Resolve the tier for a caller. Infallible: every adapter failure is
	/// absorbed into a stale or default tier here.
	pub async fn tier_for(&self, identity: &CallerIdentity) -> Tier {
		let key = match identity {
			CallerIdentity::Anonymous(_) => return Tier::Free,
			CallerIdentity::ApiKey(key) => key,
		};
		let now = types::now();

		// Fresh cache hit short-circuits; a stale hit is kept around as the
		// fail-open fallback for the refresh below.
		let stale = {
			let mut cache = self.cache.write();
			match cache.get(key) {
				Some(assignment) if now.0 - assignment.fetched_at.0 < self.ttl_secs => {
					return assignment.tier;
				}
				Some(assignment) => Some(assignment.tier),
				None => None,
			}
		};

		match tokio::time::timeout(self.refresh_timeout, self.adapter.lookup_tier(key)).await {
			Ok(Ok(info)) => {
				let mut tier = Tier::from_name(&info.tier_name).unwrap_or_else(|| {
					warn!("Unknown tier '{}' from credential service, treating as free", info.tier_name);
					Tier::Free
				});
				if let Some(expires_at) = info.expires_at {
					if expires_at <= now {
						debug!("Tier assignment for {} expired at {}", identity, expires_at);
						tier = Tier::Free;
					}
				}
				// Last-writer-wins; concurrent refreshes of one key are fine
				self.cache.write().put(key.clone(), TierAssignment { tier, fetched_at: now });
				tier
			}
			Ok(Err(err)) => self.degrade(identity, stale, &err.to_string()),
			Err(_) => self.degrade(identity, stale, "lookup timed out"),
		}
	}

	fn degrade(&self, identity: &CallerIdentity, stale: Option<Tier>, reason: &str) -> Tier {
		match stale {
			Some(tier) => {
				warn!("Tier lookup for {} failed ({}), serving stale '{}'", identity, reason, tier);
				tier
			}
			None => {
				warn!("Tier lookup for {} failed ({}), defaulting to free", identity, reason);
				Tier::Free
			}
		}
	}

	/// Number of cached assignments, for introspection
	pub fn cached(&self) -> usize {
		self.cache.read().len()
	}
}


// vim: ts=4
