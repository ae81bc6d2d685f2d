//! Rate Limiter Core
//!
//! Fixed-window admission control. Each caller identity owns one
//! `WindowCounter`; the whole budget resets at the window boundary instead
//! of decaying gradually, so burst tolerance at boundaries is part of the
//! observable contract. Counters live in a sharded LRU table: the shard
//! lock covers only the map lookup, while the read-check-increment runs
//! under the counter's own mutex, keeping distinct identities from
//! contending on a single lock.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;

use super::config::TierLimit;
use super::identity::CallerIdentity;
use crate::types::Timestamp;

const DEFAULT_SHARDS: usize = 16;

/// Admission verdict for one request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
	/// Admitted; `remaining` is the budget left in the current window
	Allow { remaining: u32 },
	/// Rejected; `retry_after` seconds until the window resets
	Deny { retry_after: i64 },
}

/// Fixed-window counter for one identity.
///
/// `count` only grows within `[window_start, window_start + window_secs)`;
/// crossing the boundary resets both fields together.
#[derive(Clone, Copy, Debug)]
struct WindowCounter {
	window_start: i64,
	count: u32,
}

type CounterSlot = Arc<Mutex<WindowCounter>>;
type Shard = Mutex<LruCache<CallerIdentity, CounterSlot>>;

/// Counter totals, for introspection and periodic logging
#[derive(Clone, Copy, Debug)]
pub struct RateLimiterStats {
	pub tracked_identities: usize,
	pub total_allowed: u64,
	pub total_denied: u64,
}

/// Sharded fixed-window rate limiter
pub struct RateLimitCore {
	shards: Box<[Shard]>,
	total_allowed: AtomicU64,
	total_denied: AtomicU64,
}

impl RateLimitCore {
	/// Create a limiter tracking at most `capacity` identities
	pub fn new(capacity: usize) -> Self {
		Self::with_shards(capacity, DEFAULT_SHARDS)
	}

	/// Create a limiter with an explicit shard count.
	///
	/// The capacity is distributed over the shards; tests use a single
	/// shard to make LRU eviction deterministic.
	pub fn with_shards(capacity: usize, shards: usize) -> Self {
		let shards = shards.max(1);
		let per_shard = NonZeroUsize::new(capacity.div_ceil(shards)).unwrap_or(NonZeroUsize::MIN);
		let shards = (0..shards).map(|_| Mutex::new(LruCache::new(per_shard))).collect();
		Self {
			shards,
			total_allowed: AtomicU64::new(0),
			total_denied: AtomicU64::new(0),
		}
	}

	/// Decide whether to admit one request from `identity` at `now`.
	///
	/// The check-and-increment is atomic per identity: concurrent calls for
	/// the same identity serialize on its counter mutex, so `count` can
	/// never exceed the budget within a window.
	pub fn admit(&self, identity: &CallerIdentity, limit: &TierLimit, now: Timestamp) -> Decision {
		if limit.requests_per_window == 0 {
			self.total_denied.fetch_add(1, Ordering::Relaxed);
			return Decision::Deny { retry_after: limit.window_secs };
		}

		let slot = self.counter_for(identity, now);
		let mut counter = slot.lock();

		if now.0 >= counter.window_start + limit.window_secs {
			// Boundary crossed: fresh budget, nothing carries over
			counter.window_start = now.0;
			counter.count = 0;
		}

		if counter.count < limit.requests_per_window {
			counter.count += 1;
			self.total_allowed.fetch_add(1, Ordering::Relaxed);
			Decision::Allow { remaining: limit.requests_per_window - counter.count }
		} else {
			self.total_denied.fetch_add(1, Ordering::Relaxed);
			Decision::Deny { retry_after: counter.window_start + limit.window_secs - now.0 }
		}
	}

	/// Fetch or lazily create the counter for an identity.
	///
	/// Holds the shard lock only for the map operation; the returned slot
	/// is locked by the caller. `LruCache::push` evicts the
	/// least-recently-touched identity once the shard is full, which at
	/// worst resets that caller's billing window early.
	fn counter_for(&self, identity: &CallerIdentity, now: Timestamp) -> CounterSlot {
		let mut shard = self.shards[self.shard_index(identity)].lock();
		if let Some(slot) = shard.get(identity) {
			return slot.clone();
		}
		let slot = Arc::new(Mutex::new(WindowCounter { window_start: now.0, count: 0 }));
		shard.push(identity.clone(), slot.clone());
		slot
	}

	fn shard_index(&self, identity: &CallerIdentity) -> usize {
		let mut hasher = DefaultHasher::new();
		identity.hash(&mut hasher);
		(hasher.finish() as usize) % self.shards.len()
	}

	/// Whether a counter is currently tracked. Does not touch LRU order.
	pub fn contains(&self, identity: &CallerIdentity) -> bool {
		self.shards[self.shard_index(identity)].lock().peek(identity).is_some()
	}

	pub fn stats(&self) -> RateLimiterStats {
		RateLimiterStats {
			tracked_identities: self.shards.iter().map(|s| s.lock().len()).sum(),
			total_allowed: self.total_allowed.load(Ordering::Relaxed),
			total_denied: self.total_denied.load(Ordering::Relaxed),
		}
	}
}


// vim: ts=4
