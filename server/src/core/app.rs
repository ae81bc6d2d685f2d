//! App state type

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::prelude::*;
use crate::core::request;
use crate::core::rate_limit::{Gate, RateLimitConfig, TierStore};
use crate::routes;
use crate::tier_adapter::TierAdapter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How the server derives client addresses for anonymous quota accounting
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServerMode {
	/// Direct connections; trust only the peer address
	Standalone,
	/// Behind a trusted reverse proxy; honor forwarding headers
	Proxy,
}

pub struct AppState {
	pub request: request::Request,
	pub gate: Arc<Gate>,
	pub opts: AppBuilderOpts,

	pub tier_adapter: Arc<dyn TierAdapter>,
}

pub type App = Arc<AppState>;

#[derive(Debug)]
pub struct AppBuilderOpts {
	mode: ServerMode,
	listen: Box<str>,
	insight_base_url: Box<str>,
	node_url: Box<str>,
	node_username: Box<str>,
	node_password: Box<str>,
	upstream_timeout: Duration,
	rate_limit: RateLimitConfig,
}

pub struct AppBuilder {
	opts: AppBuilderOpts,
	tier_adapter: Option<Arc<dyn TierAdapter>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		AppBuilder {
			opts: AppBuilderOpts {
				mode: ServerMode::Standalone,
				listen: "127.0.0.1:3000".into(),
				insight_base_url: "http://127.0.0.1:3001/api".into(),
				node_url: "http://127.0.0.1:8332/".into(),
				node_username: "".into(),
				node_password: "".into(),
				upstream_timeout: Duration::from_secs(15),
				rate_limit: RateLimitConfig::default(),
			},
			tier_adapter: None,
		}
	}

	// Opts
	pub fn mode(&mut self, mode: ServerMode) -> &mut Self { self.opts.mode = mode; self }
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self { self.opts.listen = listen.into(); self }
	pub fn insight_base_url(&mut self, url: impl Into<Box<str>>) -> &mut Self { self.opts.insight_base_url = url.into(); self }
	pub fn node_url(&mut self, url: impl Into<Box<str>>) -> &mut Self { self.opts.node_url = url.into(); self }
	pub fn node_username(&mut self, username: impl Into<Box<str>>) -> &mut Self { self.opts.node_username = username.into(); self }
	pub fn node_password(&mut self, password: impl Into<Box<str>>) -> &mut Self { self.opts.node_password = password.into(); self }
	pub fn upstream_timeout(&mut self, timeout: Duration) -> &mut Self { self.opts.upstream_timeout = timeout; self }
	pub fn rate_limit(&mut self, rate_limit: RateLimitConfig) -> &mut Self { self.opts.rate_limit = rate_limit; self }

	// Adapters
	pub fn tier_adapter(&mut self, tier_adapter: Arc<dyn TierAdapter>) -> &mut Self { self.tier_adapter = Some(tier_adapter); self }

	pub async fn run(self) -> BgResult<()> {
		tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.init();
		info!("Blockgate v{}", VERSION);

		// Undefined admission behavior is fatal; refuse to start
		self.opts.rate_limit.validate()?;

		let tier_adapter = self
			.tier_adapter
			.ok_or(Error::Config("no tier adapter configured".into()))?;

		let tiers = TierStore::new(
			tier_adapter.clone(),
			self.opts.rate_limit.tier_cache_capacity,
			self.opts.rate_limit.tier_cache_ttl,
			self.opts.rate_limit.refresh_timeout,
		);
		let gate = Arc::new(Gate::new(self.opts.rate_limit.clone(), tiers, self.opts.mode));

		let request = request::Request::new(
			self.opts.insight_base_url.clone(),
			self.opts.node_url.clone(),
			self.opts.node_username.clone(),
			self.opts.node_password.clone(),
			self.opts.upstream_timeout,
		)?;

		let app: App = Arc::new(AppState {
			request,
			gate,
			opts: self.opts,

			tier_adapter,
		});

		let router = routes::init(app.clone());

		let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await?;
		info!("Listening on {}", app.opts.listen);

		// Peer addresses must reach the gate's identity resolver
		axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await?;

		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self { Self::new() }
}

// vim: ts=4
