//! Caller Identity Resolution
//!
//! Derives the identity a request is attributed to for quota accounting:
//! the API key from the Authorization header, or the client address for
//! anonymous traffic. Address extraction honors forwarding headers only in
//! Proxy mode, since they are caller-controlled on direct connections.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::header;
use hyper::Request;

use crate::core::app::ServerMode;

/// Identity a request is attributed to for quota purposes
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum CallerIdentity {
	/// Authenticated caller, keyed by API key
	ApiKey(Box<str>),
	/// Unauthenticated caller, keyed by client address
	Anonymous(IpAddr),
}

impl CallerIdentity {
	pub fn is_anonymous(&self) -> bool {
		matches!(self, CallerIdentity::Anonymous(_))
	}
}

impl std::fmt::Display for CallerIdentity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			// Only a key prefix ever reaches the logs
			CallerIdentity::ApiKey(key) => {
				write!(f, "key:{}…", key.get(..6).unwrap_or(key))
			}
			CallerIdentity::Anonymous(addr) => write!(f, "anon:{}", addr),
		}
	}
}

/// Resolve the caller identity for a request. Always succeeds.
pub fn resolve_identity<B>(req: &Request<B>, mode: &ServerMode) -> CallerIdentity {
	if let Some(key) = extract_api_key(req) {
		return CallerIdentity::ApiKey(key);
	}
	let addr = extract_client_ip(req, mode).unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
	CallerIdentity::Anonymous(addr)
}

/// Extract a non-empty API key from the Authorization header
fn extract_api_key<B>(req: &Request<B>) -> Option<Box<str>> {
	let header = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
	let key = header.strip_prefix("Bearer ")?.trim();
	if key.is_empty() {
		None
	} else {
		Some(key.into())
	}
}

/// Extract the client address from a request based on ServerMode
///
/// - Standalone mode: use the peer address directly from ConnectInfo
/// - Proxy mode: check forwarding headers first, right-most entry wins
///   (the right-most is the one appended by the trusted reverse proxy;
///   anything left of it is caller-controlled)
pub fn extract_client_ip<B>(req: &Request<B>, mode: &ServerMode) -> Option<IpAddr> {
	match mode {
		ServerMode::Standalone => peer_ip(req),
		ServerMode::Proxy => extract_from_xff(req)
			.or_else(|| extract_from_x_real_ip(req))
			.or_else(|| extract_from_forwarded(req))
			.or_else(|| peer_ip(req)),
	}
}

fn peer_ip<B>(req: &Request<B>) -> Option<IpAddr> {
	req.extensions().get::<ConnectInfo<SocketAddr>>().map(|ci| ci.0.ip())
}

/// Extract the right-most IP from the X-Forwarded-For header
fn extract_from_xff<B>(req: &Request<B>) -> Option<IpAddr> {
	req.headers()
		.get("x-forwarded-for")
		.and_then(|h| h.to_str().ok())
		.and_then(|s| {
			// X-Forwarded-For can contain multiple IPs: "client, proxy1, proxy2"
			s.rsplit(',').next().map(|ip| ip.trim()).and_then(|ip| ip.parse().ok())
		})
}

/// Extract IP from the X-Real-IP header
fn extract_from_x_real_ip<B>(req: &Request<B>) -> Option<IpAddr> {
	req.headers()
		.get("x-real-ip")
		.and_then(|h| h.to_str().ok())
		.and_then(|s| s.trim().parse().ok())
}

/// Extract IP from the Forwarded header (RFC 7239), last element wins
fn extract_from_forwarded<B>(req: &Request<B>) -> Option<IpAddr> {
	req.headers().get("forwarded").and_then(|h| h.to_str().ok()).and_then(|s| {
		// Forwarded header format: "for=192.0.2.60;proto=http;by=203.0.113.43"
		// or with IPv6: "for=\"[2001:db8::1]\""
		s.split(&[';', ','])
			.filter(|part| part.trim().to_lowercase().starts_with("for="))
			.next_back()
			.and_then(|for_part| {
				let value = for_part
					.trim()
					.strip_prefix("for=")
					.or_else(|| for_part.trim().strip_prefix("FOR="))?;
				// Handle quoted IPv6: "for=\"[2001:db8::1]\""
				let cleaned = value.trim_matches('"').trim_matches('[').trim_matches(']');
				cleaned.parse().ok()
			})
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::Body;

	fn request(headers: &[(&str, &str)], peer: Option<&str>) -> Request<Body> {
		let mut builder = Request::builder().uri("/v1/address/");
		for (name, value) in headers {
			builder = builder.header(*name, *value);
		}
		let mut req = builder.body(Body::empty()).unwrap();
		if let Some(peer) = peer {
			let addr: SocketAddr = peer.parse().unwrap();
			req.extensions_mut().insert(ConnectInfo(addr));
		}
		req
	}

	#[test]
	fn test_api_key_identity() {
		let req = request(&[("authorization", "Bearer abc123xyz")], Some("10.0.0.1:50000"));
		let identity = resolve_identity(&req, &ServerMode::Standalone);
		assert_eq!(identity, CallerIdentity::ApiKey("abc123xyz".into()));
		assert!(!identity.is_anonymous());
	}

	#[test]
	fn test_empty_bearer_falls_back_to_anonymous() {
		let req = request(&[("authorization", "Bearer   ")], Some("10.0.0.1:50000"));
		let identity = resolve_identity(&req, &ServerMode::Standalone);
		assert_eq!(identity, CallerIdentity::Anonymous("10.0.0.1".parse().unwrap()));
	}

	#[test]
	fn test_non_bearer_authorization_ignored() {
		let req = request(&[("authorization", "Basic dXNlcjpwYXNz")], Some("10.0.0.1:50000"));
		let identity = resolve_identity(&req, &ServerMode::Standalone);
		assert!(identity.is_anonymous());
	}

	#[test]
	fn test_standalone_ignores_forwarding_headers() {
		let req = request(&[("x-forwarded-for", "198.51.100.7")], Some("10.0.0.1:50000"));
		let ip = extract_client_ip(&req, &ServerMode::Standalone);
		assert_eq!(ip, Some("10.0.0.1".parse().unwrap()));
	}

	#[test]
	fn test_proxy_takes_rightmost_xff() {
		let req = request(
			&[("x-forwarded-for", "203.0.113.9, 198.51.100.7, 192.0.2.1")],
			Some("10.0.0.1:50000"),
		);
		let ip = extract_client_ip(&req, &ServerMode::Proxy);
		assert_eq!(ip, Some("192.0.2.1".parse().unwrap()));
	}

	#[test]
	fn test_proxy_x_real_ip_fallback() {
		let req = request(&[("x-real-ip", "198.51.100.7")], Some("10.0.0.1:50000"));
		let ip = extract_client_ip(&req, &ServerMode::Proxy);
		assert_eq!(ip, Some("198.51.100.7".parse().unwrap()));
	}

	#[test]
	fn test_proxy_forwarded_header() {
		let req = request(&[("forwarded", "for=192.0.2.60;proto=http;by=203.0.113.43")], None);
		let ip = extract_client_ip(&req, &ServerMode::Proxy);
		assert_eq!(ip, Some("192.0.2.60".parse().unwrap()));
	}

	#[test]
	fn test_proxy_forwarded_quoted_ipv6() {
		let req = request(&[("forwarded", "for=\"[2001:db8::1]\"")], None);
		let ip = extract_client_ip(&req, &ServerMode::Proxy);
		assert_eq!(ip, Some("2001:db8::1".parse().unwrap()));
	}

	#[test]
	fn test_proxy_falls_back_to_peer() {
		let req = request(&[], Some("10.0.0.1:50000"));
		let ip = extract_client_ip(&req, &ServerMode::Proxy);
		assert_eq!(ip, Some("10.0.0.1".parse().unwrap()));
	}

	#[test]
	fn test_no_address_at_all_resolves_unspecified() {
		let req = request(&[], None);
		let identity = resolve_identity(&req, &ServerMode::Standalone);
		assert_eq!(identity, CallerIdentity::Anonymous(IpAddr::V4(Ipv4Addr::UNSPECIFIED)));
	}

	#[test]
	fn test_display_truncates_key() {
		let identity = CallerIdentity::ApiKey("abcdef0123456789".into());
		assert_eq!(identity.to_string(), "key:abcdef…");
	}
}

// vim: ts=4
