//! Block generation endpoints

use axum::{
	extract::{Path, Query, State},
	Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::prelude::*;
use crate::types::ApiStatus;

const DEFAULT_MAXTRIES: u64 = 1_000_000;

#[derive(Deserialize)]
pub struct GenerateQuery {
	maxtries: Option<u64>,
}

/// GET /v1/generating/ - Router liveness probe
pub async fn root() -> Json<ApiStatus> {
	Json(ApiStatus { status: "generating" })
}

/// POST /v1/generating/generateToAddress/{nblocks}/{address} - Mine blocks
/// to an address
pub async fn generate_to_address(
	State(app): State<App>,
	Path((nblocks, address)): Path<(u32, String)>,
	Query(query): Query<GenerateQuery>,
) -> BgResult<Json<Value>> {
	if address.trim().is_empty() {
		return Err(Error::BadRequest("address can not be empty".into()));
	}

	let maxtries = query.maxtries.unwrap_or(DEFAULT_MAXTRIES);
	info!("Generating {} block(s) to {}", nblocks, address);

	let result = app
		.request
		.rpc_call("generatetoaddress", json!([nblocks, address, maxtries]))
		.await?;
	Ok(Json(result))
}

// vim: ts=4
