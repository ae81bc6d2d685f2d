//! Block generation proxied to the node RPC (regtest/testnet tooling)

pub mod handler;

// vim: ts=4
