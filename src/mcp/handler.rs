//! JSON-RPC method dispatch for the MCP server.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::prompts::{get_prompt, prompt_definitions};
use super::protocol::{
    McpRequest, McpResponse, DEFAULT_PROTOCOL_VERSION, INTERNAL_ERROR, INVALID_PARAMS,
    INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND,
};
use super::tools::{tool_definitions, ToolRegistry};
use crate::types::XHuntError;

#[derive(Debug, Deserialize)]
struct NamedCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Stateless MCP method handler.
#[derive(Clone)]
pub struct McpHandler {
    tools: ToolRegistry,
    name: String,
    version: String,
}

impl McpHandler {
    pub fn new(tools: ToolRegistry, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            tools,
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Handle one request. Notifications produce no response.
    pub async fn handle(&self, request: McpRequest) -> Option<McpResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(McpResponse::error(
                request.id,
                INVALID_REQUEST,
                "Invalid Request: jsonrpc must be \"2.0\"",
            ));
        }
        if request.is_notification() || request.method.starts_with("notifications/") {
            debug!(method = %request.method, "Notification");
            return None;
        }

        let id = request.id;
        let response = match request.method.as_str() {
            "initialize" => McpResponse::success(id, self.initialize(&request.params)),
            "ping" => McpResponse::success(id, json!({})),
            "tools/list" => McpResponse::success(id, json!({ "tools": tool_definitions() })),
            "tools/call" => self.call_tool(id, request.params).await,
            "prompts/list" => McpResponse::success(id, json!({ "prompts": prompt_definitions() })),
            "prompts/get" => self.get_prompt(id, request.params),
            other => {
                warn!(method = other, "Unknown MCP method");
                McpResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}"))
            }
        };
        Some(response)
    }

    fn initialize(&self, params: &Value) -> Value {
        let protocol_version = params
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);
        json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": { "listChanged": false },
                "prompts": { "listChanged": false }
            },
            "serverInfo": {
                "name": self.name,
                "version": self.version
            }
        })
    }

    async fn call_tool(&self, id: Option<Value>, params: Value) -> McpResponse {
        let call: NamedCall = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(e) => return McpResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}")),
        };
        match self.tools.call(&call.name, &call.arguments).await {
            Ok(result) => match serde_json::to_value(result) {
                Ok(value) => McpResponse::success(id, value),
                Err(e) => McpResponse::error(id, INTERNAL_ERROR, e.to_string()),
            },
            Err(e) => error_response(id, e),
        }
    }

    fn get_prompt(&self, id: Option<Value>, params: Value) -> McpResponse {
        let call: NamedCall = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(e) => return McpResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}")),
        };
        match get_prompt(&call.name, &call.arguments) {
            Ok(result) => match serde_json::to_value(result) {
                Ok(value) => McpResponse::success(id, value),
                Err(e) => McpResponse::error(id, INTERNAL_ERROR, e.to_string()),
            },
            Err(e) => error_response(id, e),
        }
    }
}

fn error_response(id: Option<Value>, err: XHuntError) -> McpResponse {
    let code = match err {
        XHuntError::InvalidParams(_) | XHuntError::UnknownTool(_) | XHuntError::UnknownPrompt(_) => {
            INVALID_PARAMS
        }
        _ => INTERNAL_ERROR,
    };
    McpResponse::error(id, code, err.to_string())
}
