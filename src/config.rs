//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (the analysis endpoint and API key) are referenced by env-var
//! name in the config and resolved at runtime via `std::env::var`.
//! Every section has defaults, so a partial or missing file still works.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::chain::solana::{DEFAULT_COMMITMENT, DEFAULT_RPC_URL};
use crate::hover::HoverTiming;
use crate::types::XHuntError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub solana: SolanaConfig,
    #[serde(default)]
    pub hover: HoverConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "XHunt-MCP-Server".to_string(),
            version: "1.0.0".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Env var holding the analysis endpoint URL.
    pub endpoint_env: String,
    /// Optional env var holding a bearer token for the endpoint.
    pub api_key_env: Option<String>,
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint_env: "TOKEN_ANALYSIS".to_string(),
            api_key_env: None,
            timeout_secs: 30,
        }
    }
}

impl AnalysisConfig {
    /// Resolve the endpoint URL from the environment.
    pub fn endpoint(&self) -> Result<String> {
        AppConfig::resolve_env(&self.endpoint_env)
    }

    /// Resolve the API key, if one is configured and set.
    pub fn api_key(&self) -> Option<SecretString> {
        self.api_key_env
            .as_deref()
            .and_then(|env| std::env::var(env).ok())
            .filter(|key| !key.is_empty())
            .map(SecretString::new)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SolanaConfig {
    pub rpc_url: String,
    /// Env var that overrides `rpc_url` (provider URLs often embed a key).
    pub rpc_url_env: Option<String>,
    pub commitment: String,
    pub timeout_secs: u64,
}

impl Default for SolanaConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            rpc_url_env: None,
            commitment: DEFAULT_COMMITMENT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl SolanaConfig {
    pub fn rpc_url(&self) -> String {
        self.rpc_url_env
            .as_deref()
            .and_then(|env| std::env::var(env).ok())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.rpc_url.clone())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct HoverConfig {
    pub delay_ms: u64,
    pub max_wait_ms: u64,
    pub settle_ms: u64,
    pub sample_hide_delay_ms: u64,
    pub panel_leave_grace_ms: u64,
}

impl Default for HoverConfig {
    fn default() -> Self {
        let t = HoverTiming::default();
        Self {
            delay_ms: t.delay.as_millis() as u64,
            max_wait_ms: t.max_wait.as_millis() as u64,
            settle_ms: t.settle.as_millis() as u64,
            sample_hide_delay_ms: t.sample_hide_delay.as_millis() as u64,
            panel_leave_grace_ms: t.panel_leave_grace.as_millis() as u64,
        }
    }
}

impl From<&HoverConfig> for HoverTiming {
    fn from(cfg: &HoverConfig) -> Self {
        HoverTiming {
            delay: Duration::from_millis(cfg.delay_ms),
            max_wait: Duration::from_millis(cfg.max_wait_ms),
            settle: Duration::from_millis(cfg.settle_ms),
            sample_hide_delay: Duration::from_millis(cfg.sample_hide_delay_ms),
            panel_leave_grace: Duration::from_millis(cfg.panel_leave_grace_ms),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), XHuntError> {
        if self.hover.max_wait_ms < self.hover.delay_ms {
            return Err(XHuntError::Config(format!(
                "hover.max_wait_ms ({}) must not be shorter than hover.delay_ms ({})",
                self.hover.max_wait_ms, self.hover.delay_ms
            )));
        }
        if self.server.port == 0 {
            return Err(XHuntError::Config("server.port must be non-zero".into()));
        }
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config() {
        // Requires config.toml in the working directory (the crate root
        // under `cargo test`); absence is acceptable.
        if let Ok(cfg) = AppConfig::load("config.toml") {
            assert_eq!(cfg.server.name, "XHunt-MCP-Server");
            assert_eq!(cfg.server.port, 3000);
            assert_eq!(cfg.analysis.endpoint_env, "TOKEN_ANALYSIS");
            assert_eq!(HoverTiming::from(&cfg.hover), HoverTiming::default());
        }
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let cfg = AppConfig::parse("").unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.solana.commitment, "confirmed");
        assert_eq!(cfg.hover, HoverConfig::default());
    }

    #[test]
    fn test_partial_section() {
        let cfg = AppConfig::parse("[hover]\ndelay_ms = 1000\n").unwrap();
        let timing = HoverTiming::from(&cfg.hover);
        assert_eq!(timing.delay, Duration::from_millis(1000));
        assert_eq!(timing.max_wait, Duration::from_millis(1000));
        assert_eq!(timing.settle, Duration::from_millis(100));
    }

    #[test]
    fn test_rejects_max_wait_below_delay() {
        let err = AppConfig::parse("[hover]\ndelay_ms = 2000\n").unwrap_err();
        assert!(err.to_string().contains("max_wait_ms"));
    }

    #[test]
    fn test_rejects_bad_toml() {
        assert!(AppConfig::parse("[server\nport = 1").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let cfg = AppConfig::load_or_default("definitely-not-here.toml").unwrap();
        assert_eq!(cfg.server.name, "XHunt-MCP-Server");
        assert!(AppConfig::load("definitely-not-here.toml").is_err());
    }

    #[test]
    fn test_rpc_url_without_override() {
        let cfg = SolanaConfig::default();
        assert_eq!(cfg.rpc_url(), DEFAULT_RPC_URL);
    }

    #[test]
    fn test_missing_analysis_endpoint_env() {
        let cfg = AnalysisConfig {
            endpoint_env: "XHUNT_TEST_UNSET_ENDPOINT_VAR".into(),
            ..AnalysisConfig::default()
        };
        assert!(cfg.endpoint().is_err());
        assert!(cfg.api_key().is_none());
    }
}
