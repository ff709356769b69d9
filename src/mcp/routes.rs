//! MCP HTTP route handlers.
//!
//! Stateless Streamable-HTTP transport: every POST is dispatched on its own,
//! there are no sessions and no server-initiated streams.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::handler::McpHandler;
use super::protocol::{McpRequest, McpResponse, INVALID_REQUEST, METHOD_NOT_ALLOWED, PARSE_ERROR};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

pub struct McpState {
    pub handler: McpHandler,
    pub started_at: DateTime<Utc>,
}

impl McpState {
    pub fn new(handler: McpHandler) -> Self {
        Self {
            handler,
            started_at: Utc::now(),
        }
    }
}

pub type AppState = Arc<McpState>;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub name: String,
    pub version: String,
    pub uptime_secs: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /mcp: single request, notification, or batch.
pub async fn post_mcp(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "Unparseable MCP payload");
            return rpc_error(StatusCode::BAD_REQUEST, PARSE_ERROR, "Parse error");
        }
    };

    match payload {
        Value::Array(items) => {
            if items.is_empty() {
                return rpc_error(
                    StatusCode::BAD_REQUEST,
                    INVALID_REQUEST,
                    "Invalid Request: empty batch",
                );
            }
            let mut responses = Vec::with_capacity(items.len());
            for item in items {
                if let Some(resp) = dispatch(&state, item).await {
                    responses.push(resp);
                }
            }
            if responses.is_empty() {
                StatusCode::ACCEPTED.into_response()
            } else {
                Json(responses).into_response()
            }
        }
        single => match dispatch(&state, single).await {
            Some(resp) => Json(resp).into_response(),
            None => StatusCode::ACCEPTED.into_response(),
        },
    }
}

async fn dispatch(state: &McpState, item: Value) -> Option<McpResponse> {
    let id = item.get("id").cloned();
    let request: McpRequest = match serde_json::from_value(item) {
        Ok(r) => r,
        Err(e) => {
            return Some(McpResponse::error(
                id,
                INVALID_REQUEST,
                format!("Invalid Request: {e}"),
            ))
        }
    };

    let span = info_span!("mcp_request", request_id = %Uuid::new_v4(), method = %request.method);
    async {
        info!("MCP request");
        state.handler.handle(request).await
    }
    .instrument(span)
    .await
}

/// GET and DELETE /mcp: no SSE stream and no sessions to terminate.
pub async fn method_not_allowed() -> Response {
    rpc_error(
        StatusCode::METHOD_NOT_ALLOWED,
        METHOD_NOT_ALLOWED,
        "Method not allowed.",
    )
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        name: state.handler.name().to_string(),
        version: state.handler.version().to_string(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

fn rpc_error(status: StatusCode, code: i32, message: &str) -> Response {
    (status, Json(McpResponse::error(None, code, message))).into_response()
}
