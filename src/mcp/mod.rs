//! MCP (Model Context Protocol) server implementations.
//!
//! This module exposes the task tracker to MCP clients.

#[cfg(feature = "mcp")]
pub mod tasks_server;

#[cfg(feature = "mcp")]
pub use tasks_server::TaskbotServer;
