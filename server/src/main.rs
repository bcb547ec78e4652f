//! Stdio MCP server for the HTTP request tool
//!
//! Speaks line-delimited JSON-RPC 2.0 on stdin/stdout: one message per
//! line in, one response per line out. Diagnostics go to stderr so the
//! protocol channel stays clean.
//!
//! Two tools are exposed:
//! - `http_request` performs an HTTP request with timeout handling and
//!   exponential-backoff retries
//! - `http_stats` reports usage statistics accumulated since startup

use async_trait::async_trait;
use http_request_core::params::{
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_MS, MAX_RETRIES_MAX,
    RETRY_DELAY_MS_MAX, RETRY_DELAY_MS_MIN, TIMEOUT_MS_MAX, TIMEOUT_MS_MIN,
};
use http_request_core::{RequestStats, execute};
use http_request_mcp::{
    CallToolParams, CallToolResult, JsonRpcId, JsonRpcMessage, JsonRpcResponse, ListToolsParams,
    ListToolsResult, McpConnection, McpHandler, McpServerConfig, Tool, invalid_request,
    parse_error,
};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HTTP_REQUEST_TOOL: &str = "http_request";
const HTTP_STATS_TOOL: &str = "http_stats";

struct HttpRequestHandler {
    stats: RequestStats,
}

impl HttpRequestHandler {
    fn new() -> Self {
        Self {
            stats: RequestStats::new(),
        }
    }
}

#[async_trait]
impl McpHandler for HttpRequestHandler {
    async fn list_tools(&self, _params: ListToolsParams) -> anyhow::Result<ListToolsResult> {
        Ok(ListToolsResult {
            tools: tool_definitions(),
            next_cursor: None,
        })
    }

    async fn call_tool(&self, params: CallToolParams) -> anyhow::Result<CallToolResult> {
        match params.name.as_str() {
            HTTP_REQUEST_TOOL => {
                let args = params.arguments.unwrap_or_else(|| serde_json::json!({}));
                let outcome = execute(&args, &self.stats).await;
                Ok(CallToolResult::text(outcome.text, outcome.is_error))
            }
            HTTP_STATS_TOOL => Ok(CallToolResult::text(self.stats.report(), false)),
            other => Ok(CallToolResult::text(format!("Unknown tool: {other}"), true)),
        }
    }
}

fn tool_definitions() -> Vec<Tool> {
    vec![
        Tool {
            name: HTTP_REQUEST_TOOL.to_string(),
            title: Some("HTTP Request Tool".to_string()),
            description: Some(
                "Performs an HTTP request with customizable parameters, per-attempt timeouts, \
                 and exponential-backoff retries."
                    .to_string(),
            ),
            input_schema: http_request_schema(),
        },
        Tool {
            name: HTTP_STATS_TOOL.to_string(),
            title: Some("HTTP Request Statistics".to_string()),
            description: Some(
                "Returns usage statistics for the http_request tool: request counts, response \
                 times, and status code and error breakdowns."
                    .to_string(),
            ),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        },
    ]
}

fn http_request_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "url": {
                "type": "string",
                "format": "uri",
                "description": "Absolute URL to request"
            },
            "method": {
                "type": "string",
                "enum": ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD"],
                "default": "GET",
                "description": "HTTP method (case-insensitive)"
            },
            "headers": {
                "type": "object",
                "additionalProperties": { "type": "string" },
                "description": "Request headers; a JSON-encoded string of the same map is also accepted"
            },
            "body": {
                "type": "string",
                "description": "Request body, ignored for GET and HEAD"
            },
            "timeout": {
                "type": "integer",
                "minimum": TIMEOUT_MS_MIN,
                "maximum": TIMEOUT_MS_MAX,
                "default": DEFAULT_TIMEOUT_MS,
                "description": "Per-attempt deadline in milliseconds"
            },
            "maxRetries": {
                "type": "integer",
                "minimum": 0,
                "maximum": MAX_RETRIES_MAX,
                "default": DEFAULT_MAX_RETRIES,
                "description": "Attempt budget; 0 still makes one attempt"
            },
            "retryDelay": {
                "type": "integer",
                "minimum": RETRY_DELAY_MS_MIN,
                "maximum": RETRY_DELAY_MS_MAX,
                "default": DEFAULT_RETRY_DELAY_MS,
                "description": "Initial inter-attempt delay in milliseconds, doubled after each failure"
            },
            "followRedirects": {
                "type": "boolean",
                "default": true,
                "description": "Follow HTTP redirects automatically"
            }
        },
        "required": ["url"]
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // JSON-RPC rides on stdout; never log there
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,http_request_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "http-request-server starting on stdio"
    );

    let config = McpServerConfig::new("http-request-server", env!("CARGO_PKG_VERSION"))
        .with_instructions(
            "Use http_request to fetch URLs on the agent's behalf; use http_stats to inspect \
             accumulated request statistics.",
        );
    run_stdio(HttpRequestHandler::new(), config).await
}

async fn run_stdio(handler: HttpRequestHandler, config: McpServerConfig) -> anyhow::Result<()> {
    let mut conn = McpConnection::new(handler, config);

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let value: Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(e) => {
                write_response(&mut stdout, &parse_error(&e.to_string())).await?;
                continue;
            }
        };

        // One message per line; JSON-RPC batching is not supported
        if value.is_array() {
            let response = invalid_request(JsonRpcId::Null, "batching not supported");
            write_response(&mut stdout, &response).await?;
            continue;
        }

        let message: JsonRpcMessage = match serde_json::from_value(value) {
            Ok(message) => message,
            Err(e) => {
                let response = invalid_request(JsonRpcId::Null, &e.to_string());
                write_response(&mut stdout, &response).await?;
                continue;
            }
        };

        if let Some(response) = conn.handle_message(message).await {
            write_response(&mut stdout, &response).await?;
        }
    }

    info!("stdin closed, shutting down");
    Ok(())
}

async fn write_response(
    stdout: &mut tokio::io::Stdout,
    response: &JsonRpcResponse,
) -> anyhow::Result<()> {
    let out = serde_json::to_string(response)?;
    stdout.write_all(out.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}
