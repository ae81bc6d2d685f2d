use axum::{http::StatusCode, routing::{get, post}, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::app::{AppState, VERSION};
use crate::core::rate_limit::RateLimitGateLayer;
use crate::{address, generating, mining};

fn init_v1(state: Arc<AppState>) -> Router {
	let address_router = Router::new()
		.route("/", get(address::handler::root))
		.route("/details/{address}", get(address::handler::details_single))
		.route("/details", post(address::handler::details_bulk));

	let mining_router = Router::new()
		.route("/", get(mining::handler::root))
		.route("/getMiningInfo", get(mining::handler::get_mining_info))
		.route("/getNetworkHashps", get(mining::handler::get_network_hashps))
		.route("/getBlockTemplate/{template_request}", get(mining::handler::get_block_template))
		.route("/submitBlock/{hex}", post(mining::handler::submit_block));

	let generating_router = Router::new()
		.route("/", get(generating::handler::root))
		.route("/generateToAddress/{nblocks}/{address}", post(generating::handler::generate_to_address));

	// Every v1 route sits behind the rate limit gate
	Router::new()
		.nest("/address", address_router)
		.nest("/mining", mining_router)
		.nest("/generating", generating_router)
		.layer(RateLimitGateLayer::new(state.gate.clone()))
		.with_state(state)
}

async fn root() -> Json<Value> {
	Json(json!({ "status": "blockgate", "version": VERSION }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
	(StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" })))
}

pub fn init(state: Arc<AppState>) -> Router {
	Router::new()
		.route("/", get(root))
		.nest("/v1", init_v1(state))
		.fallback(not_found)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

// vim: ts=4
