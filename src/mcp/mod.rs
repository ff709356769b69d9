//! MCP tool server: JSON-RPC over stateless HTTP.
//!
//! Exposes the ticker-analysis backend and read-only Solana lookups as MCP
//! tools, plus one storage-deposit prompt. CORS is open so browser-hosted
//! agents can call it.

pub mod handler;
pub mod prompts;
pub mod protocol;
pub mod routes;
pub mod tools;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::ServerConfig;

pub use handler::McpHandler;
pub use routes::{AppState, McpState};
pub use tools::ToolRegistry;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    Router::new()
        .route(
            "/mcp",
            post(routes::post_mcp)
                .get(routes::method_not_allowed)
                .delete(routes::method_not_allowed),
        )
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until Ctrl+C.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind MCP port {addr}"))?;

    info!(%addr, name = %config.name, "MCP server listening on http://{addr}/mcp");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("MCP server error")?;

    info!("MCP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{MockTickerAnalysisSource, TokenAnalysis};
    use crate::chain::MockChainRpc;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state(analysis: MockTickerAnalysisSource) -> AppState {
        let tools = ToolRegistry::new(Arc::new(analysis), Arc::new(MockChainRpc::new()));
        Arc::new(McpState::new(McpHandler::new(tools, "XHunt-MCP-Server", "1.0.0")))
    }

    fn post(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(test_state(MockTickerAnalysisSource::new()));
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["name"], "XHunt-MCP-Server");
    }

    #[tokio::test]
    async fn test_get_and_delete_not_allowed() {
        for method in ["GET", "DELETE"] {
            let app = build_router(test_state(MockTickerAnalysisSource::new()));
            let resp = app
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri("/mcp")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
            let body = body_json(resp).await;
            assert_eq!(body["error"]["code"], -32000);
            assert_eq!(body["error"]["message"], "Method not allowed.");
            assert_eq!(body["id"], Value::Null);
        }
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let app = build_router(test_state(MockTickerAnalysisSource::new()));
        let resp = app.oneshot(post("{not json")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_tool_call_over_http() {
        let mut analysis = MockTickerAnalysisSource::new();
        analysis.expect_analyze().returning(|_, _| {
            Ok(Some(TokenAnalysis {
                answer: "Mostly neutral".into(),
                ..Default::default()
            }))
        });
        let app = build_router(test_state(analysis));
        let req = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "getTokenAnalysis", "arguments": {"ticker": "$SOL"}}
        });
        let resp = app.oneshot(post(req.to_string())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["result"]["content"][0]["text"], "Mostly neutral");
        assert_eq!(body["result"]["content"][1]["text"], "[]");
    }

    #[tokio::test]
    async fn test_notification_is_accepted() {
        let app = build_router(test_state(MockTickerAnalysisSource::new()));
        let req = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        let resp = app.oneshot(post(req.to_string())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_batch() {
        let app = build_router(test_state(MockTickerAnalysisSource::new()));
        let req = json!([
            {"jsonrpc": "2.0", "id": 1, "method": "ping"},
            {"jsonrpc": "2.0", "method": "notifications/initialized"},
            {"jsonrpc": "2.0", "id": 2, "method": "tools/list"},
            {"id": 3}
        ]);
        let resp = app.oneshot(post(req.to_string())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["id"], 1);
        assert_eq!(items[1]["result"]["tools"].as_array().unwrap().len(), 4);
        assert_eq!(items[2]["id"], 3);
        assert_eq!(items[2]["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_empty_batch_is_invalid() {
        let app = build_router(test_state(MockTickerAnalysisSource::new()));
        let resp = app.oneshot(post("[]")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"]["code"], -32600);
    }
}
