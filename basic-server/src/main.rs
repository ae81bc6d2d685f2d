use std::env;
use std::sync::Arc;

use blockgate::{AppBuilder, ServerMode};
use blockgate_tier_adapter_http::TierAdapterHttp;

pub struct Config {
	pub listen: String,
	pub insight_url: String,
	pub node_url: String,
	pub node_username: String,
	pub node_password: String,
	pub tier_service_url: String,
	pub tier_service_token: Option<String>,
	pub trust_proxy: bool,
}

#[tokio::main]
async fn main() {
	let _ = dotenvy::dotenv();

	let config = Config {
		listen: env::var("LISTEN").unwrap_or("127.0.0.1:3000".to_string()),
		insight_url: env::var("INSIGHT_URL").expect("FATAL: INSIGHT_URL is required"),
		node_url: env::var("NODE_URL").expect("FATAL: NODE_URL is required"),
		node_username: env::var("NODE_USERNAME").unwrap_or_default(),
		node_password: env::var("NODE_PASSWORD").unwrap_or_default(),
		tier_service_url: env::var("TIER_SERVICE_URL").expect("FATAL: TIER_SERVICE_URL is required"),
		tier_service_token: env::var("TIER_SERVICE_TOKEN").ok(),
		trust_proxy: env::var("TRUST_PROXY").map(|v| v == "1" || v == "true").unwrap_or(false),
	};

	let mut tier_adapter = TierAdapterHttp::new(config.tier_service_url).unwrap();
	if let Some(token) = config.tier_service_token {
		tier_adapter = tier_adapter.with_service_token(token);
	}

	let mut builder = AppBuilder::new();
	builder
		.listen(config.listen)
		.insight_base_url(config.insight_url)
		.node_url(config.node_url)
		.node_username(config.node_username)
		.node_password(config.node_password)
		.tier_adapter(Arc::new(tier_adapter));
	if config.trust_proxy {
		builder.mode(ServerMode::Proxy);
	}

	builder.run().await.unwrap();
}

// vim: ts=4
