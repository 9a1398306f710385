//! MCP message handling over JSON-RPC 2.0.
//!
//! Only the stateless request/response subset of the Streamable HTTP
//! transport is served: each POST carries one JSON-RPC message and gets one
//! JSON reply. There are no sessions and no server-initiated streams.

pub mod tools;

use axum::http::StatusCode;
use daiso_scraper::DaisoClient;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub use tools::{call_tool, tool_definitions, ToolDefinition, ToolError};

pub const SERVER_NAME: &str = "daiso-mcp";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol revisions this server can speak, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    /// `None` marks a notification.
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcResponse {
    #[must_use]
    pub fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    #[must_use]
    pub fn err(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// What the HTTP layer should send back for one incoming message.
#[derive(Debug)]
pub enum McpReply {
    /// Notification accepted; no body.
    Accepted,
    Message(StatusCode, RpcResponse),
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Parses and answers one raw JSON-RPC message.
pub async fn handle_message(client: &DaisoClient, body: &[u8]) -> McpReply {
    let raw: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "unparseable MCP message");
            return McpReply::Message(
                StatusCode::BAD_REQUEST,
                RpcResponse::err(Value::Null, PARSE_ERROR, format!("parse error: {e}")),
            );
        }
    };

    if raw.is_array() {
        return McpReply::Message(
            StatusCode::BAD_REQUEST,
            RpcResponse::err(
                Value::Null,
                INVALID_REQUEST,
                "batch requests are not supported",
            ),
        );
    }

    let raw_id = raw.get("id").cloned().unwrap_or(Value::Null);
    let request: RpcRequest = match serde_json::from_value(raw) {
        Ok(request) => request,
        Err(e) => {
            return McpReply::Message(
                StatusCode::BAD_REQUEST,
                RpcResponse::err(raw_id, INVALID_REQUEST, format!("invalid request: {e}")),
            );
        }
    };

    if request.jsonrpc.as_deref() != Some("2.0") {
        return McpReply::Message(
            StatusCode::BAD_REQUEST,
            RpcResponse::err(raw_id, INVALID_REQUEST, "jsonrpc must be \"2.0\""),
        );
    }

    let Some(id) = request.id else {
        tracing::debug!(method = %request.method, "received notification");
        return McpReply::Accepted;
    };

    let response = dispatch(client, id, &request.method, request.params).await;
    McpReply::Message(StatusCode::OK, response)
}

async fn dispatch(client: &DaisoClient, id: Value, method: &str, params: Value) -> RpcResponse {
    match method {
        "initialize" => RpcResponse::ok(id, initialize_result(&params)),
        "ping" => RpcResponse::ok(id, json!({})),
        "tools/list" => match serde_json::to_value(tool_definitions()) {
            Ok(tools) => RpcResponse::ok(id, json!({ "tools": tools })),
            Err(e) => RpcResponse::err(id, INTERNAL_ERROR, format!("failed to list tools: {e}")),
        },
        "tools/call" => call(client, id, params).await,
        other => RpcResponse::err(id, METHOD_NOT_FOUND, format!("method not found: {other}")),
    }
}

/// Echoes the client's protocol version when supported, otherwise offers
/// the newest one.
fn initialize_result(params: &Value) -> Value {
    let requested = params.get("protocolVersion").and_then(Value::as_str);
    let version = requested
        .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);

    json!({
        "protocolVersion": version,
        "capabilities": { "tools": {} },
        "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION }
    })
}

async fn call(client: &DaisoClient, id: Value, params: Value) -> RpcResponse {
    let params: CallToolParams = match serde_json::from_value(params) {
        Ok(params) => params,
        Err(e) => {
            return RpcResponse::err(id, INVALID_PARAMS, format!("invalid tools/call params: {e}"))
        }
    };

    tracing::info!(tool = %params.name, "calling tool");
    match call_tool(client, &params.name, params.arguments).await {
        Ok(result) => RpcResponse::ok(id, text_content(&result)),
        Err(e) if e.is_protocol_error() => RpcResponse::err(id, INVALID_PARAMS, e.to_string()),
        Err(e) => {
            tracing::warn!(tool = %params.name, error = %e, "tool call failed");
            RpcResponse::ok(id, error_content(&e.to_string()))
        }
    }
}

/// Wraps a tool result in the single-text-block envelope.
fn text_content(result: &Value) -> Value {
    let text = serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
    envelope(text, false)
}

fn error_content(message: &str) -> Value {
    envelope(message.to_string(), true)
}

fn envelope(text: String, is_error: bool) -> Value {
    let mut content = json!({ "content": [{ "type": "text", "text": text }] });
    if is_error {
        content["isError"] = Value::Bool(true);
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use daiso_scraper::DaisoEndpoints;

    fn offline_client() -> DaisoClient {
        DaisoClient::with_endpoints(
            5,
            "daiso-test/0.1",
            &DaisoEndpoints::single_host("http://127.0.0.1:9"),
        )
        .expect("build test client")
    }

    async fn reply(body: &Value) -> (StatusCode, Value) {
        let bytes = serde_json::to_vec(body).expect("encode request");
        match handle_message(&offline_client(), &bytes).await {
            McpReply::Message(status, response) => (
                status,
                serde_json::to_value(response).expect("encode response"),
            ),
            McpReply::Accepted => panic!("expected a response, got Accepted"),
        }
    }

    #[tokio::test]
    async fn initialize_echoes_supported_protocol_version() {
        let (status, body) = reply(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {"protocolVersion": "2024-11-05", "capabilities": {}}
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 1);
        assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(body["result"]["serverInfo"]["name"], "daiso-mcp");
        assert_eq!(body["result"]["capabilities"], json!({"tools": {}}));
    }

    #[tokio::test]
    async fn initialize_offers_latest_version_for_unknown_request() {
        let (_, body) = reply(&json!({
            "jsonrpc": "2.0",
            "id": "init",
            "method": "initialize",
            "params": {"protocolVersion": "1999-01-01"}
        }))
        .await;
        assert_eq!(body["result"]["protocolVersion"], SUPPORTED_PROTOCOL_VERSIONS[0]);
    }

    #[tokio::test]
    async fn notification_is_accepted_without_body() {
        let bytes = serde_json::to_vec(&json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }))
        .expect("encode");
        assert!(matches!(
            handle_message(&offline_client(), &bytes).await,
            McpReply::Accepted
        ));
    }

    #[tokio::test]
    async fn ping_returns_empty_object() {
        let (_, body) = reply(&json!({"jsonrpc": "2.0", "id": 7, "method": "ping"})).await;
        assert_eq!(body["result"], json!({}));
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn tools_list_names_every_tool() {
        let (_, body) = reply(&json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
        let names: Vec<&str> = body["result"]["tools"]
            .as_array()
            .expect("tools array")
            .iter()
            .filter_map(|t| t["name"].as_str())
            .collect();
        assert_eq!(names.len(), 6);
        assert!(names.contains(&"find_stores"));
        assert!(names.contains(&"list_neighborhoods"));
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let (status, body) =
            reply(&json!({"jsonrpc": "2.0", "id": 3, "method": "resources/list"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn unparseable_body_is_parse_error_with_null_id() {
        match handle_message(&offline_client(), b"{not json").await {
            McpReply::Message(status, response) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(response.id, Value::Null);
                assert_eq!(response.error.map(|e| e.code), Some(PARSE_ERROR));
            }
            McpReply::Accepted => panic!("expected parse error"),
        }
    }

    #[tokio::test]
    async fn missing_jsonrpc_version_is_invalid_request() {
        let (status, body) = reply(&json!({"id": 4, "method": "ping"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["id"], 4);
        assert_eq!(body["error"]["code"], INVALID_REQUEST);
    }

    #[tokio::test]
    async fn batch_is_invalid_request() {
        let (status, body) =
            reply(&json!([{"jsonrpc": "2.0", "id": 1, "method": "ping"}])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], INVALID_REQUEST);
    }

    #[tokio::test]
    async fn tools_call_with_unknown_tool_is_invalid_params() {
        let (_, body) = reply(&json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": {"name": "nope", "arguments": {}}
        }))
        .await;
        assert_eq!(body["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn failing_tool_returns_error_envelope() {
        let (status, body) = reply(&json!({
            "jsonrpc": "2.0",
            "id": 6,
            "method": "tools/call",
            "params": {"name": "find_stores", "arguments": {}}
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.get("error").is_none());
        assert_eq!(body["result"]["isError"], true);
        assert_eq!(body["result"]["content"][0]["type"], "text");
        assert_eq!(
            body["result"]["content"][0]["text"],
            "either keyword or sido is required"
        );
    }

    #[test]
    fn text_content_pretty_prints_result() {
        let content = text_content(&json!({"a": 1}));
        assert_eq!(content["content"][0]["text"], "{\n  \"a\": 1\n}");
        assert!(content.get("isError").is_none());
    }
}
