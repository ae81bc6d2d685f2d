//! Mining operations proxied to the node RPC

pub mod handler;

// vim: ts=4
