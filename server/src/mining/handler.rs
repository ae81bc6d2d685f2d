//! Mining endpoints
//!
//! Direct passthrough of the node's mining RPC family. Results are
//! forwarded as-is; the node owns the wire format.

use axum::{
	extract::{Path, Query, State},
	Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::prelude::*;
use crate::types::ApiStatus;

#[derive(Deserialize)]
pub struct NetworkHashpsQuery {
	nblocks: Option<i64>,
	height: Option<i64>,
}

#[derive(Deserialize)]
pub struct SubmitBlockQuery {
	parameters: Option<String>,
}

/// GET /v1/mining/ - Router liveness probe
pub async fn root() -> Json<ApiStatus> {
	Json(ApiStatus { status: "mining" })
}

/// GET /v1/mining/getMiningInfo - Node mining state
pub async fn get_mining_info(State(app): State<App>) -> BgResult<Json<Value>> {
	let result = app.request.rpc_call("getmininginfo", json!([])).await?;
	Ok(Json(result))
}

/// GET /v1/mining/getNetworkHashps - Estimated network hashes per second
pub async fn get_network_hashps(
	State(app): State<App>,
	Query(query): Query<NetworkHashpsQuery>,
) -> BgResult<Json<Value>> {
	// Node defaults: 120 blocks, current height
	let params = json!([query.nblocks.unwrap_or(120), query.height.unwrap_or(-1)]);
	let result = app.request.rpc_call("getnetworkhashps", params).await?;
	Ok(Json(result))
}

/// GET /v1/mining/getBlockTemplate/{template_request} - Block template for miners
pub async fn get_block_template(
	State(app): State<App>,
	Path(template_request): Path<String>,
) -> BgResult<Json<Value>> {
	let template_request: Value = serde_json::from_str(&template_request)
		.map_err(|_| Error::BadRequest("template request must be a JSON object".into()))?;

	let result = app.request.rpc_call("getblocktemplate", json!([template_request])).await?;
	Ok(Json(result))
}

/// POST /v1/mining/submitBlock/{hex} - Submit a mined block
pub async fn submit_block(
	State(app): State<App>,
	Path(hex): Path<String>,
	Query(query): Query<SubmitBlockQuery>,
) -> BgResult<Json<Value>> {
	if hex.trim().is_empty() {
		return Err(Error::BadRequest("block hex can not be empty".into()));
	}

	let params = match query.parameters {
		Some(parameters) if !parameters.is_empty() => json!([hex, parameters]),
		_ => json!([hex]),
	};

	info!("Submitting block ({} bytes of hex)", hex.len());

	// Returns null when the block is accepted
	let result = app.request.rpc_call("submitblock", params).await?;
	Ok(Json(result))
}

// vim: ts=4
