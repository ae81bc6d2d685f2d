//! Address detail endpoints
//!
//! Thin proxy over the explorer's `/addr/{address}` resource. The gateway
//! adds pagination metadata and strips the echoed address; everything else
//! passes through untouched.

use axum::{
	extract::{Path, Query, State},
	Json,
};
use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::prelude::*;
use crate::types::ApiStatus;

/// The explorer's default (and maximum) page size
const PAGE_SIZE: u64 = 1000;

/// Bulk lookups are capped to keep one request from monopolizing the
/// upstream connection pool
const MAX_BULK_ADDRESSES: usize = 20;

#[derive(Deserialize)]
pub struct DetailsQuery {
	page: Option<u64>,
}

#[derive(Deserialize)]
pub struct DetailsBulkReq {
	addresses: Vec<String>,
}

/// GET /v1/address/ - Router liveness probe
pub async fn root() -> Json<ApiStatus> {
	Json(ApiStatus { status: "address" })
}

/// Query the explorer for details on a single address
async fn details_from_insight(app: &App, address: &str, page: u64) -> BgResult<Value> {
	let from = page * PAGE_SIZE;
	let to = from + PAGE_SIZE;
	let path = format!("/addr/{}?from={}&to={}", address, from, to);

	let mut data = app.request.insight_get(&path).await?;

	if let Some(obj) = data.as_object_mut() {
		let tx_count = obj.get("txApperances").and_then(Value::as_u64).unwrap_or(0);
		obj.remove("addrStr");
		obj.insert("currentPage".into(), json!(page));
		obj.insert("pagesTotal".into(), json!(tx_count.div_ceil(PAGE_SIZE)));
	}

	Ok(data)
}

/// GET /v1/address/details/{address} - Details for a single address
pub async fn details_single(
	State(app): State<App>,
	Path(address): Path<String>,
	Query(query): Query<DetailsQuery>,
) -> BgResult<Json<Value>> {
	let address = address.trim();
	if address.is_empty() {
		return Err(Error::BadRequest("address can not be empty".into()));
	}

	debug!("Executing address/details for {}", address);

	let data = details_from_insight(&app, address, query.page.unwrap_or(0)).await?;
	Ok(Json(data))
}

/// POST /v1/address/details - Bulk details lookup
pub async fn details_bulk(
	State(app): State<App>,
	Json(req): Json<DetailsBulkReq>,
) -> BgResult<Json<Vec<Value>>> {
	if req.addresses.is_empty() {
		return Err(Error::BadRequest("addresses must be a non-empty array".into()));
	}
	if req.addresses.len() > MAX_BULK_ADDRESSES {
		return Err(Error::BadRequest(
			format!("array too large. Max {} addresses", MAX_BULK_ADDRESSES).into(),
		));
	}
	if req.addresses.iter().any(|address| address.trim().is_empty()) {
		return Err(Error::BadRequest("address can not be empty".into()));
	}

	debug!("Executing address/details for {} addresses", req.addresses.len());

	let lookups = req
		.addresses
		.iter()
		.map(|address| details_from_insight(&app, address.trim(), 0));
	let details = try_join_all(lookups).await?;

	Ok(Json(details))
}


// vim: ts=4
