use axum::{response::IntoResponse, Json, http::StatusCode};
use serde_json::json;

pub type BgResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	PermissionDenied,
	/// Invalid configuration, fatal at startup
	Config(Box<str>),
	/// Malformed client input
	BadRequest(Box<str>),
	/// A proxied upstream call failed
	Upstream(Box<str>),

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		Self::Upstream(err.to_string().into())
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::Config(msg) => write!(f, "configuration error: {}", msg),
			Error::BadRequest(msg) => write!(f, "bad request: {}", msg),
			Error::Upstream(msg) => write!(f, "upstream error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		match self {
			Error::NotFound => {
				(StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" }))).into_response()
			}
			Error::BadRequest(msg) => {
				(StatusCode::BAD_REQUEST, Json(json!({ "error": msg.as_ref() }))).into_response()
			}
			Error::Upstream(msg) => {
				(StatusCode::BAD_GATEWAY, Json(json!({ "error": msg.as_ref() }))).into_response()
			}
			Error::PermissionDenied => StatusCode::FORBIDDEN.into_response(),
			_ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
		}
	}
}

// vim: ts=4
