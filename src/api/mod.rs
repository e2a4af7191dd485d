//! API Module
//!
//! REST endpoints for the node catalog and the HTTP server that also hosts
//! the MCP transport.

pub mod rest;
pub mod server;

pub use rest::*;
pub use server::*;
