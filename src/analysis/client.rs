//! HTTP client for the ticker analysis backend.
//!
//! POSTs `{ "ticker": ..., "ca": ... }` to the configured endpoint and
//! unwraps the `{ code, data }` envelope.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{AnalysisEnvelope, TickerAnalysisSource, TokenAnalysis};
use crate::config::AnalysisConfig;

const USER_AGENT: &str = "XHunt/0.1.0 (ticker-analysis)";

#[derive(Debug, Serialize)]
struct AnalysisRequest<'a> {
    ticker: &'a str,
    ca: &'a str,
}

/// Ticker analysis backend client.
pub struct HttpAnalysisClient {
    http: Client,
    endpoint: String,
    api_key: Option<SecretString>,
}

impl HttpAnalysisClient {
    pub fn new(endpoint: String, api_key: Option<SecretString>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for analysis backend")?;

        Ok(Self {
            http,
            endpoint,
            api_key,
        })
    }

    /// Build from config, resolving the endpoint and key env vars.
    pub fn from_config(cfg: &AnalysisConfig) -> Result<Self> {
        let endpoint = cfg.endpoint()?;
        Self::new(endpoint, cfg.api_key(), Duration::from_secs(cfg.timeout_secs))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TickerAnalysisSource for HttpAnalysisClient {
    async fn analyze(&self, ticker: &str, contract_address: &str) -> Result<Option<TokenAnalysis>> {
        debug!(ticker, ca = contract_address, "Fetching ticker analysis");

        let mut req = self.http.post(&self.endpoint).json(&AnalysisRequest {
            ticker,
            ca: contract_address,
        });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key.expose_secret());
        }

        let resp = req.send().await.context("Analysis API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Analysis API error {status}: {body}");
        }

        let envelope: AnalysisEnvelope = resp
            .json()
            .await
            .context("Failed to parse analysis response")?;

        if envelope.code != 200 {
            warn!(
                ticker,
                code = envelope.code,
                message = envelope.message.as_deref().unwrap_or(""),
                "Analysis backend has no data for ticker"
            );
        }

        Ok(envelope.into_analysis())
    }
}
