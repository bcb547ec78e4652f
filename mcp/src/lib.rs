//! # MCP Server Plumbing
//!
//! Transport-agnostic pieces of a Model Context Protocol tool server:
//! the JSON-RPC 2.0 message types, the MCP lifecycle and tool wire
//! types, and a per-connection state machine that dispatches requests
//! to a [`McpHandler`].
//!
//! The crate deliberately stops short of I/O. A binary owns the
//! transport (one JSON message per line on stdio is the common case),
//! feeds decoded [`JsonRpcMessage`] values into [`McpConnection`], and
//! writes back whatever responses come out.
//!
//! ```ignore
//! let config = McpServerConfig::new("my-server", env!("CARGO_PKG_VERSION"));
//! let mut conn = McpConnection::new(handler, config);
//! while let Some(line) = lines.next_line().await? {
//!     match serde_json::from_str::<JsonRpcMessage>(&line) {
//!         Ok(message) => {
//!             if let Some(response) = conn.handle_message(message).await {
//!                 emit(&response)?;
//!             }
//!         }
//!         Err(e) => emit(&parse_error(&e.to_string()))?,
//!     }
//! }
//! ```

/// JSON-RPC 2.0 message framing
pub mod jsonrpc;
/// Connection lifecycle and request dispatch
pub mod server;
/// MCP wire types for the lifecycle and tool methods
pub mod types;

pub use jsonrpc::{
    JsonRpcError, JsonRpcId, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
};
pub use server::{
    McpConnection, McpHandler, McpServerConfig, invalid_request, make_initialized_notification,
    parse_error,
};
pub use types::{
    CallToolParams, CallToolResult, ContentBlock, InitializeParams, InitializeResult,
    ListToolsParams, ListToolsResult, McpClientInfo, McpServerInfo, Tool,
};

/// Newest protocol revision this crate understands
pub const PROTOCOL_VERSION_LATEST: &str = "2025-11-25";

/// Previous protocol revision, still accepted during negotiation
pub const PROTOCOL_VERSION_2025_06_18: &str = "2025-06-18";
