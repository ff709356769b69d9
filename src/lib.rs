//! XHunt — hover cashtag detection and social analytics tool server.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod analysis;
pub mod chain;
pub mod config;
pub mod hover;
pub mod mcp;
pub mod panel;
pub mod profile;
pub mod types;
