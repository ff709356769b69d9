//! XHunt MCP server.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the analysis and Solana clients, and serves MCP over HTTP
//! until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use xhunt::analysis::client::HttpAnalysisClient;
use xhunt::analysis::{TickerAnalysisSource, UnconfiguredAnalysis};
use xhunt::chain::solana::SolanaRpcClient;
use xhunt::config;
use xhunt::mcp::{self, McpHandler, McpState, ToolRegistry};

const BANNER: &str = r#"
__  ___   _             _
\ \/ / | | |_   _ _ __ | |_
 \  /| |_| | | | | '_ \| __|
 /  \|  _  | |_| | | | | |_
/_/\_\_| |_|\__,_|_| |_|\__|

  Cashtag analytics over MCP
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = config::AppConfig::load_or_default("config.toml")?;

    init_logging();

    println!("{BANNER}");
    info!(
        name = %cfg.server.name,
        version = %cfg.server.version,
        port = cfg.server.port,
        "XHunt starting up"
    );

    // -- Backends --------------------------------------------------------

    let analysis: Arc<dyn TickerAnalysisSource> = match HttpAnalysisClient::from_config(&cfg.analysis) {
        Ok(client) => {
            info!(endpoint = %client.endpoint(), "Ticker analysis backend configured");
            Arc::new(client)
        }
        Err(e) => {
            warn!(error = %e, "No ticker analysis backend; getTokenAnalysis will report errors");
            Arc::new(UnconfiguredAnalysis::new(cfg.analysis.endpoint_env.clone()))
        }
    };

    let chain = SolanaRpcClient::from_config(&cfg.solana)?;
    info!(rpc = %chain.url(), commitment = %cfg.solana.commitment, "Solana RPC configured");

    // -- Serve -----------------------------------------------------------

    let tools = ToolRegistry::new(analysis, Arc::new(chain));
    let handler = McpHandler::new(tools, cfg.server.name.clone(), cfg.server.version.clone());
    let state = Arc::new(McpState::new(handler));

    mcp::serve(&cfg.server, state).await?;

    info!("XHunt shut down cleanly");
    Ok(())
}

/// Initialise the tracing subscriber.
///
/// `RUST_LOG` controls the filter (default `xhunt=info`); setting
/// `XHUNT_LOG_JSON` switches to JSON lines.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("xhunt=info"));

    let json_logging = std::env::var("XHUNT_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
