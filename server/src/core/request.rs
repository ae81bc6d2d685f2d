//! Outbound clients for the proxied services
//!
//! One shared reqwest client covers both upstreams: plain GETs against the
//! Insight block explorer and JSON-RPC 1.0 calls against the node. The
//! request timeout is set once at construction so a slow upstream cannot
//! stall the handler pool.

use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::{BgResult, Error};
use crate::prelude::*;

#[derive(Debug, Clone)]
pub struct Request {
	client: reqwest::Client,
	insight_base_url: Box<str>,
	node_url: Box<str>,
	node_username: Box<str>,
	node_password: Box<str>,
}

/// JSON-RPC 1.0 response envelope
#[derive(Debug, Deserialize)]
struct RpcEnvelope {
	#[serde(default)]
	result: Value,
	error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
	code: i64,
	message: String,
}

impl Request {
	pub fn new(
		insight_base_url: impl Into<Box<str>>,
		node_url: impl Into<Box<str>>,
		node_username: impl Into<Box<str>>,
		node_password: impl Into<Box<str>>,
		timeout: Duration,
	) -> BgResult<Self> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|err| Error::Config(format!("http client: {}", err).into()))?;

		Ok(Request {
			client,
			insight_base_url: insight_base_url.into(),
			node_url: node_url.into(),
			node_username: node_username.into(),
			node_password: node_password.into(),
		})
	}

	/// GET a JSON document from the Insight API
	pub async fn insight_get(&self, path: &str) -> BgResult<Value> {
		let url = format!("{}{}", self.insight_base_url, path);
		debug!("Insight GET {}", path);

		let res = self.client.get(&url).send().await?;
		if !res.status().is_success() {
			warn!("Insight request {} failed: {}", path, res.status());
			return Err(Error::Upstream(format!("explorer returned {}", res.status()).into()));
		}

		Ok(res.json().await?)
	}

	/// Call a node RPC method (JSON-RPC 1.0, basic auth).
	///
	/// Returns the raw `result` value; `submitblock` and friends legally
	/// return null on success.
	pub async fn rpc_call(&self, method: &str, params: Value) -> BgResult<Value> {
		let body = json!({
			"jsonrpc": "1.0",
			"id": method,
			"method": method,
			"params": params,
		});
		debug!("Node RPC {}", method);

		let res = self
			.client
			.post(self.node_url.as_ref())
			.basic_auth(self.node_username.as_ref(), Some(self.node_password.as_ref()))
			.json(&body)
			.send()
			.await?;

		let envelope: RpcEnvelope = res.json().await?;
		if let Some(err) = envelope.error {
			warn!("Node RPC {} failed: {} ({})", method, err.message, err.code);
			return Err(Error::Upstream(err.message.into()));
		}

		Ok(envelope.result)
	}
}


// vim: ts=4
