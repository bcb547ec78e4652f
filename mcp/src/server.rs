//! MCP server connection state machine
//!
//! A connection starts in [`ConnState::New`], answers `initialize`, and
//! becomes ready to serve tools once the client follows up with the
//! `notifications/initialized` notification. Tool requests arriving
//! before that point are rejected with the MCP "server not initialized"
//! error code.

use async_trait::async_trait;

use crate::jsonrpc::{
    JsonRpcError, JsonRpcId, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
};
use crate::types::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, ListToolsParams,
    ListToolsResult, McpServerInfo,
};
use crate::{PROTOCOL_VERSION_2025_06_18, PROTOCOL_VERSION_LATEST};

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;
const NOT_INITIALIZED: i64 = -32002;

/// Protocol revisions this server can speak, newest first
const SUPPORTED_PROTOCOL_VERSIONS: &[&str] =
    &[PROTOCOL_VERSION_LATEST, PROTOCOL_VERSION_2025_06_18];

/// What the server exposes: identity plus the tool callbacks
#[async_trait]
pub trait McpHandler: Send + Sync {
    /// List the tools available on this server
    async fn list_tools(&self, params: ListToolsParams) -> anyhow::Result<ListToolsResult>;

    /// Invoke a tool by name
    async fn call_tool(&self, params: CallToolParams) -> anyhow::Result<CallToolResult>;
}

/// Static configuration for a server connection
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Identity announced in the `initialize` result
    pub server_info: McpServerInfo,
    /// Optional usage hints surfaced to the client
    pub instructions: Option<String>,
}

impl McpServerConfig {
    /// Config with the given identity and no instructions
    #[must_use]
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            server_info: McpServerInfo {
                name: name.to_string(),
                version: version.to_string(),
            },
            instructions: None,
        }
    }

    /// Attach usage hints for the `initialize` result
    #[must_use]
    pub fn with_instructions(mut self, text: impl Into<String>) -> Self {
        self.instructions = Some(text.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnState {
    New,
    InitResponded,
    Ready,
}

/// One client connection: lifecycle state plus the tool handler
#[derive(Debug)]
pub struct McpConnection<H> {
    handler: H,
    config: McpServerConfig,
    state: ConnState,
}

impl<H: McpHandler> McpConnection<H> {
    /// New connection awaiting `initialize`
    #[must_use]
    pub fn new(handler: H, config: McpServerConfig) -> Self {
        Self {
            handler,
            config,
            state: ConnState::New,
        }
    }

    /// Dispatch one incoming message
    ///
    /// Requests produce a response; notifications and stray responses
    /// produce `None`.
    pub async fn handle_message(&mut self, message: JsonRpcMessage) -> Option<JsonRpcResponse> {
        match message {
            JsonRpcMessage::Request(request) => Some(self.handle_request(request).await),
            JsonRpcMessage::Notification(notification) => {
                self.handle_notification(&notification);
                None
            }
            // This server never issues client-bound requests
            JsonRpcMessage::Response(_) => None,
        }
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            // Liveness probe, valid in any state
            "ping" => JsonRpcResponse::ok(request.id, serde_json::json!({})),
            _ if self.state != ConnState::Ready => not_initialized(request.id),
            "tools/list" => self.handle_list_tools(request).await,
            "tools/call" => self.handle_call_tool(request).await,
            other => method_not_found(request.id, other),
        }
    }

    fn handle_initialize(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        if self.state != ConnState::New {
            return invalid_request(request.id, "initialize may only be sent once");
        }
        let params: InitializeParams = match request.params {
            Some(value) => match serde_json::from_value(value) {
                Ok(params) => params,
                Err(e) => return invalid_params(request.id, &e.to_string()),
            },
            None => return invalid_params(request.id, "initialize requires params"),
        };

        let result = InitializeResult {
            protocol_version: negotiate_protocol(&params.protocol_version).to_string(),
            capabilities: serde_json::json!({ "tools": {} }),
            server_info: self.config.server_info.clone(),
            instructions: self.config.instructions.clone(),
        };
        self.state = ConnState::InitResponded;
        JsonRpcResponse::ok(
            request.id,
            serde_json::to_value(result).unwrap_or(serde_json::Value::Null),
        )
    }

    async fn handle_list_tools(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: ListToolsParams = match request.params {
            Some(value) => match serde_json::from_value(value) {
                Ok(params) => params,
                Err(e) => return invalid_params(request.id, &e.to_string()),
            },
            None => ListToolsParams::default(),
        };
        match self.handler.list_tools(params).await {
            Ok(result) => JsonRpcResponse::ok(
                request.id,
                serde_json::to_value(result).unwrap_or(serde_json::Value::Null),
            ),
            Err(e) => internal_error(request.id, &e.to_string()),
        }
    }

    async fn handle_call_tool(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: CallToolParams = match request.params {
            Some(value) => match serde_json::from_value(value) {
                Ok(params) => params,
                Err(e) => return invalid_params(request.id, &e.to_string()),
            },
            None => return invalid_params(request.id, "tools/call requires params"),
        };
        match self.handler.call_tool(params).await {
            Ok(result) => JsonRpcResponse::ok(
                request.id,
                serde_json::to_value(result).unwrap_or(serde_json::Value::Null),
            ),
            Err(e) => internal_error(request.id, &e.to_string()),
        }
    }

    fn handle_notification(&mut self, notification: &JsonRpcNotification) {
        if notification.method == "notifications/initialized"
            && self.state == ConnState::InitResponded
        {
            self.state = ConnState::Ready;
        }
        // Other notifications carry no obligations for a tool server
    }
}

/// Pick the client's protocol revision when supported, otherwise the latest
fn negotiate_protocol(requested: &str) -> &'static str {
    SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .find(|supported| **supported == requested)
        .copied()
        .unwrap_or(PROTOCOL_VERSION_LATEST)
}

/// Response for input that is not parseable as JSON
///
/// There is no usable request id at that point, so the id is `null`.
#[must_use]
pub fn parse_error(detail: &str) -> JsonRpcResponse {
    JsonRpcResponse::err(
        JsonRpcId::Null,
        JsonRpcError {
            code: PARSE_ERROR,
            message: "Parse error".to_string(),
            data: Some(serde_json::json!({ "detail": detail })),
        },
    )
}

/// Response for JSON that is not a valid JSON-RPC request
#[must_use]
pub fn invalid_request(id: JsonRpcId, detail: &str) -> JsonRpcResponse {
    JsonRpcResponse::err(
        id,
        JsonRpcError {
            code: INVALID_REQUEST,
            message: "Invalid request".to_string(),
            data: Some(serde_json::json!({ "detail": detail })),
        },
    )
}

fn method_not_found(id: JsonRpcId, method: &str) -> JsonRpcResponse {
    JsonRpcResponse::err(
        id,
        JsonRpcError {
            code: METHOD_NOT_FOUND,
            message: format!("Method not found: {method}"),
            data: None,
        },
    )
}

fn invalid_params(id: JsonRpcId, detail: &str) -> JsonRpcResponse {
    JsonRpcResponse::err(
        id,
        JsonRpcError {
            code: INVALID_PARAMS,
            message: "Invalid params".to_string(),
            data: Some(serde_json::json!({ "detail": detail })),
        },
    )
}

fn internal_error(id: JsonRpcId, detail: &str) -> JsonRpcResponse {
    JsonRpcResponse::err(
        id,
        JsonRpcError {
            code: INTERNAL_ERROR,
            message: "Internal error".to_string(),
            data: Some(serde_json::json!({ "detail": detail })),
        },
    )
}

fn not_initialized(id: JsonRpcId) -> JsonRpcResponse {
    JsonRpcResponse::err(
        id,
        JsonRpcError {
            code: NOT_INITIALIZED,
            message: "Server not initialized".to_string(),
            data: None,
        },
    )
}

/// The notification a client sends to complete the handshake
#[must_use]
pub fn make_initialized_notification() -> JsonRpcNotification {
    JsonRpcNotification::new("notifications/initialized", None)
}
