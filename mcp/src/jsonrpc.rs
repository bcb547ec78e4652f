//! JSON-RPC 2.0 message types for the stdio transport
//!
//! Wire shapes only: requests, notifications, responses, and the untagged
//! envelope that tells them apart. Lifecycle enforcement and method routing
//! live in the server module.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request identifier: a number, a string, or an explicit null
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcId {
    /// Numeric id
    Number(i64),
    /// String id
    String(String),
    /// Explicit `null` id, used when answering unparseable input
    Null,
}

/// A call that expects a response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version marker, always "2.0"
    pub jsonrpc: String,
    /// Identifier echoed back in the response
    pub id: JsonRpcId,
    /// Method name
    pub method: String,
    /// Method parameters, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Build a request with the version marker set
    pub fn new(id: JsonRpcId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// A call that expects no response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// Protocol version marker, always "2.0"
    pub jsonrpc: String,
    /// Method name
    pub method: String,
    /// Method parameters, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    /// Build a notification with the version marker set
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
        }
    }
}

/// Error payload carried by a failed response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Numeric error code per the JSON-RPC spec
    pub code: i64,
    /// Short human-readable message
    pub message: String,
    /// Optional structured detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Answer to a request: exactly one of `result` or `error` is present
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version marker, always "2.0"
    pub jsonrpc: String,
    /// Identifier of the request being answered
    pub id: JsonRpcId,
    /// Success payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Build a success response
    #[must_use]
    pub fn ok(id: JsonRpcId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Build an error response
    #[must_use]
    pub fn err(id: JsonRpcId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Any incoming JSON-RPC message
///
/// Untagged: a request is recognized by its `id` and `method`, a
/// notification by `method` alone, a response by the absence of `method`.
/// The variant order matters for deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    /// Call expecting a response
    Request(JsonRpcRequest),
    /// Call expecting no response
    Notification(JsonRpcNotification),
    /// Answer to an earlier call
    Response(JsonRpcResponse),
}
