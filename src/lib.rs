//! Tab Wrangler: tracks tab activity and archives idle tabs into a bounded,
//! searchable, persisted history.
//!
//! This library crate exposes all modules for use by the RPC binary and integration tests.

pub mod app;
pub mod database;
pub mod host;
pub mod managers;
pub mod rpc_handler;
pub mod services;
pub mod types;
