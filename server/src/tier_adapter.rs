use async_trait::async_trait;

use crate::error::BgResult;
use crate::types::Timestamp;

/// Tier assignment as reported by the credential service
#[derive(Debug)]
pub struct TierInfo {
	pub tier_name: Box<str>,
	/// When the caller's subscription lapses, if the service reports one
	pub expires_at: Option<Timestamp>,
}

/// Seam to the external credential service owning API-key tier assignments.
///
/// Lookups may fail (timeout, network, 5xx); the tier store absorbs every
/// failure into a usable `Tier` value, so adapters just report errors as-is.
#[async_trait]
pub trait TierAdapter: Send + Sync {
	/// Resolve the quota tier for an API key
	async fn lookup_tier(&self, api_key: &str) -> BgResult<TierInfo>;
}

// vim: ts=4
