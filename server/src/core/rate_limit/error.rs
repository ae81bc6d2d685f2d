//! Rate Limiting Error Types
//!
//! The quota-exceeded rejection is an expected outcome, not a fault: it maps
//! to a 429 with a machine-readable retry hint and is logged at info level
//! by the gate, never as an error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Rate limit rejection
#[derive(Debug)]
pub enum RateLimitError {
	/// Request budget exhausted for the caller's tier
	LimitExceeded {
		/// Tier the budget belongs to
		tier: &'static str,
		/// Seconds until the caller's window resets
		retry_after: i64,
	},
}

impl std::fmt::Display for RateLimitError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			RateLimitError::LimitExceeded { tier, retry_after } => {
				write!(f, "Rate limit exceeded for {} tier, retry after {}s", tier, retry_after)
			}
		}
	}
}

impl std::error::Error for RateLimitError {}

impl IntoResponse for RateLimitError {
	fn into_response(self) -> Response {
		match self {
			RateLimitError::LimitExceeded { tier, retry_after } => {
				let body = serde_json::json!({
					"error": "Too many requests. Please slow down.",
					"retryAfter": retry_after,
				});

				let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

				if let Ok(val) = retry_after.to_string().parse() {
					response.headers_mut().insert("Retry-After", val);
				}
				if let Ok(val) = tier.parse() {
					response.headers_mut().insert("X-RateLimit-Tier", val);
				}

				response
			}
		}
	}
}


// vim: ts=4
