//! Rate Limiting System
//!
//! Authentication-tiered rate limiting for the v1 API surface. Each request
//! is classified by caller identity (API key or client address), its quota
//! tier is resolved through the credential service behind a bounded-TTL
//! cache, and a fixed-window budget is enforced per identity before the
//! request reaches any proxy handler.

mod config;
mod error;
mod gate;
mod identity;
mod limiter;
mod tier;

pub use config::{RateLimitConfig, TierLimit};
pub use error::RateLimitError;
pub use gate::{Gate, RateLimitGateLayer};
pub use identity::{extract_client_ip, resolve_identity, CallerIdentity};
pub use limiter::{Decision, RateLimitCore, RateLimiterStats};
pub use tier::{Tier, TierStore};

// vim: ts=4
