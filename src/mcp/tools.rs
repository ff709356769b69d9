//! MCP tools.
//!
//! - `getTokenAnalysis`: social-sentiment analysis of a cashtag
//! - `getAccountInfo`: Solana account lookup
//! - `getBalance`: Solana balance lookup
//! - `getMinimumBalanceForRentExemption`: storage deposit for N bytes
//!
//! Backend failures are reported in-band (`isError` + `Error: ...`) so the
//! agent sees them; only unknown tools and bad arguments are protocol errors.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use super::protocol::{Tool, ToolResult};
use crate::analysis::TickerAnalysisSource;
use crate::chain::{lamports_to_sol, validate_pubkey, ChainRpc};
use crate::hover::ticker::normalize_ticker;
use crate::types::XHuntError;

pub const GET_TOKEN_ANALYSIS: &str = "getTokenAnalysis";
pub const GET_ACCOUNT_INFO: &str = "getAccountInfo";
pub const GET_BALANCE: &str = "getBalance";
pub const GET_RENT_EXEMPTION: &str = "getMinimumBalanceForRentExemption";

/// Reply when the analysis backend does not know a ticker.
pub const TICKER_NOT_FOUND: &str = "Xhunt doesn't find this ticker";

/// Tool definitions for `tools/list`.
pub fn tool_definitions() -> Vec<Tool> {
    vec![
        Tool {
            name: GET_TOKEN_ANALYSIS.to_string(),
            description: Some("Analyze a token based on Twitter social data".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "ticker": {
                        "type": "string",
                        "description": "Token symbol, with or without the leading $ (e.g. 'BTC', '$ETH')"
                    },
                    "ca": {
                        "type": "string",
                        "description": "Contract address to disambiguate the token (optional)"
                    }
                },
                "required": ["ticker"]
            }),
        },
        Tool {
            name: GET_ACCOUNT_INFO.to_string(),
            description: Some("Get Solana account information for a public key".to_string()),
            input_schema: pubkey_schema(),
        },
        Tool {
            name: GET_BALANCE.to_string(),
            description: Some("Get the SOL balance of a Solana account".to_string()),
            input_schema: pubkey_schema(),
        },
        Tool {
            name: GET_RENT_EXEMPTION.to_string(),
            description: Some(
                "Calculate the SOL deposit needed to store a number of bytes rent-free on Solana"
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "bytes": {
                        "type": ["integer", "string"],
                        "description": "Account data size in bytes"
                    }
                },
                "required": ["bytes"]
            }),
        },
    ]
}

fn pubkey_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "publicKey": {
                "type": "string",
                "description": "Base58-encoded account public key"
            }
        },
        "required": ["publicKey"]
    })
}

/// Executes tool calls against the configured backends.
#[derive(Clone)]
pub struct ToolRegistry {
    analysis: Arc<dyn TickerAnalysisSource>,
    chain: Arc<dyn ChainRpc>,
}

impl ToolRegistry {
    pub fn new(analysis: Arc<dyn TickerAnalysisSource>, chain: Arc<dyn ChainRpc>) -> Self {
        Self { analysis, chain }
    }

    /// Run `name` with `arguments`.
    pub async fn call(&self, name: &str, arguments: &Value) -> Result<ToolResult, XHuntError> {
        info!(tool = name, "Tool call");
        match name {
            GET_TOKEN_ANALYSIS => self.token_analysis(arguments).await,
            GET_ACCOUNT_INFO => self.account_info(arguments).await,
            GET_BALANCE => self.balance(arguments).await,
            GET_RENT_EXEMPTION => self.rent_exemption(arguments).await,
            other => Err(XHuntError::UnknownTool(other.to_string())),
        }
    }

    async fn token_analysis(&self, args: &Value) -> Result<ToolResult, XHuntError> {
        let ticker = required_str(args, "ticker")?;
        if normalize_ticker(ticker).is_none() {
            return Err(XHuntError::InvalidParams(format!(
                "'{ticker}' is not a token symbol"
            )));
        }
        let ca = optional_str(args, "ca").unwrap_or_default();

        Ok(match self.analysis.analyze(ticker, ca).await {
            Ok(Some(analysis)) => {
                let tweets = serde_json::to_string(&analysis.tweets)
                    .unwrap_or_else(|_| "[]".to_string());
                ToolResult::texts([analysis.summary().to_string(), tweets])
            }
            Ok(None) => ToolResult::text(TICKER_NOT_FOUND),
            Err(e) => {
                warn!(ticker, error = %e, "Token analysis failed");
                ToolResult::error(format!("{e:#}"))
            }
        })
    }

    async fn account_info(&self, args: &Value) -> Result<ToolResult, XHuntError> {
        let pubkey = required_str(args, "publicKey")?;
        validate_pubkey(pubkey)?;

        Ok(match self.chain.account_info(pubkey).await {
            Ok(Some(info)) => ToolResult::text(pretty(&json!({
                "publicKey": pubkey,
                "lamports": info.lamports,
                "sol": info.sol().to_string(),
                "owner": info.owner,
                "executable": info.executable,
                "rentEpoch": info.rent_epoch,
                "space": info.space,
            }))),
            Ok(None) => ToolResult::text(format!("Account {pubkey} not found")),
            Err(e) => {
                warn!(pubkey, error = %e, "getAccountInfo failed");
                ToolResult::error(format!("{e:#}"))
            }
        })
    }

    async fn balance(&self, args: &Value) -> Result<ToolResult, XHuntError> {
        let pubkey = required_str(args, "publicKey")?;
        validate_pubkey(pubkey)?;

        Ok(match self.chain.balance(pubkey).await {
            Ok(lamports) => ToolResult::text(pretty(&json!({
                "publicKey": pubkey,
                "lamports": lamports,
                "sol": lamports_to_sol(lamports).to_string(),
            }))),
            Err(e) => {
                warn!(pubkey, error = %e, "getBalance failed");
                ToolResult::error(format!("{e:#}"))
            }
        })
    }

    async fn rent_exemption(&self, args: &Value) -> Result<ToolResult, XHuntError> {
        let bytes = required_u64(args, "bytes")?;

        Ok(match self.chain.minimum_balance_for_rent_exemption(bytes).await {
            Ok(lamports) => ToolResult::text(pretty(&json!({
                "bytes": bytes,
                "lamports": lamports,
                "sol": lamports_to_sol(lamports).to_string(),
            }))),
            Err(e) => {
                warn!(bytes, error = %e, "getMinimumBalanceForRentExemption failed");
                ToolResult::error(format!("{e:#}"))
            }
        })
    }
}

// -- Argument helpers ------------------------------------------------------

fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str).map(str::trim)
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, XHuntError> {
    optional_str(args, key)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| XHuntError::InvalidParams(format!("missing string argument '{key}'")))
}

/// Accepts a JSON number or a numeric string (prompt arguments are strings).
fn required_u64(args: &Value, key: &str) -> Result<u64, XHuntError> {
    let value = args
        .get(key)
        .ok_or_else(|| XHuntError::InvalidParams(format!("missing argument '{key}'")))?;
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| {
            XHuntError::InvalidParams(format!("argument '{key}' must be a non-negative integer"))
        })
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
