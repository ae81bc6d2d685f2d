//! HTTP tier adapter
//!
//! Resolves API-key quota tiers against the credential service's REST API
//! (`GET {base}/keys/{key}`). The adapter only reports what the service
//! says; caching, staleness and failure degradation live in the server's
//! tier store.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use blockgate::error::{BgResult, Error};
use blockgate::tier_adapter::{TierAdapter, TierInfo};
use blockgate::types::Timestamp;

/// Wire format of the credential service's key lookup response
#[derive(Debug, Deserialize)]
struct KeyRecord {
	tier: String,
	#[serde(rename = "expiresAt")]
	expires_at: Option<i64>,
}

pub struct TierAdapterHttp {
	client: reqwest::Client,
	base_url: Box<str>,
	service_token: Option<Box<str>>,
}

impl TierAdapterHttp {
	pub fn new(base_url: impl Into<Box<str>>) -> BgResult<Self> {
		// The adapter's own timeout is a backstop; the tier store applies
		// its tighter refresh timeout around every call
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(5))
			.build()
			.map_err(|err| Error::Config(format!("tier adapter client: {}", err).into()))?;

		Ok(Self {
			client,
			base_url: base_url.into(),
			service_token: None,
		})
	}

	/// Authenticate gateway-to-service calls with a bearer token
	pub fn with_service_token(mut self, token: impl Into<Box<str>>) -> Self {
		self.service_token = Some(token.into());
		self
	}
}

#[async_trait]
impl TierAdapter for TierAdapterHttp {
	async fn lookup_tier(&self, api_key: &str) -> BgResult<TierInfo> {
		let url = format!("{}/keys/{}", self.base_url, api_key);

		let mut req = self.client.get(&url);
		if let Some(token) = &self.service_token {
			req = req.bearer_auth(token.as_ref());
		}

		let res = req
			.send()
			.await
			.map_err(|err| Error::Upstream(format!("credential service: {}", err).into()))?;

		match res.status() {
			status if status.is_success() => {
				let record: KeyRecord = res
					.json()
					.await
					.map_err(|err| Error::Upstream(format!("credential service: {}", err).into()))?;
				Ok(TierInfo {
					tier_name: record.tier.into(),
					expires_at: record.expires_at.map(Timestamp),
				})
			}
			reqwest::StatusCode::NOT_FOUND => Err(Error::NotFound),
			status => {
				Err(Error::Upstream(format!("credential service returned {}", status).into()))
			}
		}
	}
}


// vim: ts=4
