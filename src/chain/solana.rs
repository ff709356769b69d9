//! Solana JSON-RPC client.
//!
//! Docs: https://solana.com/docs/rpc/http
//! Every call is a JSON-RPC 2.0 POST; errors come back in the envelope with
//! HTTP 200, so both layers are checked.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use super::{AccountInfo, ChainRpc};
use crate::config::SolanaConfig;
use crate::types::XHuntError;

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_COMMITMENT: &str = "confirmed";

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Results wrapped in `{ "context": { "slot": .. }, "value": .. }`.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

/// Solana RPC client.
pub struct SolanaRpcClient {
    http: Client,
    url: String,
    commitment: String,
    next_id: AtomicU64,
}

impl SolanaRpcClient {
    pub fn new(url: impl Into<String>, commitment: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for Solana RPC")?;

        Ok(Self {
            http,
            url: url.into(),
            commitment: commitment.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn from_config(cfg: &SolanaConfig) -> Result<Self> {
        Self::new(cfg.rpc_url(), cfg.commitment.clone(), Duration::from_secs(cfg.timeout_secs))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_body(&self, method: &str, params: Value) -> Value {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let body = self.request_body(method, params);
        debug!(method, "Solana RPC call");

        let resp = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Solana RPC {method} request failed"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Solana RPC {method} HTTP {status}: {text}");
        }

        let envelope: RpcEnvelope<T> = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse Solana RPC {method} response"))?;

        unwrap_envelope(method, envelope)
    }
}

fn unwrap_envelope<T>(method: &str, envelope: RpcEnvelope<T>) -> Result<T> {
    if let Some(err) = envelope.error {
        return Err(XHuntError::Chain {
            method: method.to_string(),
            message: format!("{} (code {})", err.message, err.code),
        }
        .into());
    }
    envelope.result.ok_or_else(|| {
        XHuntError::Chain {
            method: method.to_string(),
            message: "response has neither result nor error".to_string(),
        }
        .into()
    })
}

#[async_trait]
impl ChainRpc for SolanaRpcClient {
    async fn account_info(&self, pubkey: &str) -> Result<Option<AccountInfo>> {
        let params = json!([pubkey, { "encoding": "base64", "commitment": self.commitment }]);
        let res: WithContext<Option<AccountInfo>> = self.call("getAccountInfo", params).await?;
        Ok(res.value)
    }

    async fn balance(&self, pubkey: &str) -> Result<u64> {
        let params = json!([pubkey, { "commitment": self.commitment }]);
        let res: WithContext<u64> = self.call("getBalance", params).await?;
        Ok(res.value)
    }

    async fn minimum_balance_for_rent_exemption(&self, bytes: u64) -> Result<u64> {
        let params = json!([bytes, { "commitment": self.commitment }]);
        self.call("getMinimumBalanceForRentExemption", params).await
    }
}
