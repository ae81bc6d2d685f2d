//! Blockgate is a REST API gateway for blockchain infrastructure.
//!
//! # Features
//!
//! - Proxies address and balance lookups to an Insight block explorer
//! - Proxies mining and block generation operations to a node's JSON-RPC
//!   interface
//! - Authentication-tiered rate limiting
//!		- anonymous callers are tracked per client address
//!		- API-key callers get their quota tier from a credential service
//!		- fixed-window budgets, enforced per caller identity
//!	- Tier assignments cached with a bounded TTL; credential-service
//!	  outages degrade to stale or Free, never to request failures

#![forbid(unsafe_code)]

pub mod error;
pub mod core;
pub mod address;
pub mod generating;
pub mod mining;
pub mod prelude;
pub mod routes;
pub mod tier_adapter;
pub mod types;

pub use crate::core::app::{App, AppBuilder, AppState, ServerMode};

// vim: ts=4
