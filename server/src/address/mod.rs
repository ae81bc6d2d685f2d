//! Address lookups proxied to the Insight block explorer

pub mod handler;

// vim: ts=4
