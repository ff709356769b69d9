//! Ticker analysis backend.
//!
//! Defines the `TickerAnalysisSource` trait and the payload the backend
//! returns for a cashtag: related KOL tweets plus an AI-written summary.

pub mod client;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::XHuntError;

/// A tweet shown alongside a ticker analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HoverTweet {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub create_time: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub tweet_id: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub view_count: u64,
}

/// Analysis payload for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TokenAnalysis {
    #[serde(default)]
    pub tweets: Vec<HoverTweet>,
    #[serde(default)]
    pub answer: String,
    /// Summary from the secondary model; what agents are given.
    #[serde(default, rename = "answerDS")]
    pub answer_ds: String,
    #[serde(default)]
    pub is_json: bool,
    #[serde(default)]
    pub from_all_kol: bool,
}

impl TokenAnalysis {
    /// The summary to surface: `answerDS` when present, else `answer`.
    pub fn summary(&self) -> &str {
        if self.answer_ds.trim().is_empty() {
            &self.answer
        } else {
            &self.answer_ds
        }
    }
}

/// Backend response wrapper: `{ "code": 200, "data": { ... } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisEnvelope {
    pub code: i64,
    #[serde(default)]
    pub data: Option<TokenAnalysis>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AnalysisEnvelope {
    /// `Some` only for a successful response that carries data.
    pub fn into_analysis(self) -> Option<TokenAnalysis> {
        if self.code == 200 {
            self.data
        } else {
            None
        }
    }
}

/// Abstraction over ticker analysis backends.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TickerAnalysisSource: Send + Sync {
    /// Analyse `ticker`, optionally pinned to a contract address (`ca`, may
    /// be empty). `Ok(None)` means the backend does not know the ticker.
    async fn analyze(&self, ticker: &str, contract_address: &str) -> Result<Option<TokenAnalysis>>;
}

/// Stand-in used when no analysis endpoint is configured; every call fails
/// with a message naming the missing variable.
pub struct UnconfiguredAnalysis {
    env_var: String,
}

impl UnconfiguredAnalysis {
    pub fn new(env_var: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
        }
    }
}

#[async_trait]
impl TickerAnalysisSource for UnconfiguredAnalysis {
    async fn analyze(&self, _ticker: &str, _contract_address: &str) -> Result<Option<TokenAnalysis>> {
        Err(XHuntError::Analysis(format!(
            "analysis endpoint not configured (set {})",
            self.env_var
        ))
        .into())
    }
}

/// Compact engagement count: `999`, `1.2K`, `3.4M`.
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_source_errors() {
        let source = UnconfiguredAnalysis::new("TOKEN_ANALYSIS");
        let err = source.analyze("$BTC", "").await.unwrap_err();
        assert!(err.to_string().contains("TOKEN_ANALYSIS"));
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1.0K");
        assert_eq!(format_count(1_240), "1.2K");
        assert_eq!(format_count(3_400_000), "3.4M");
    }

    #[test]
    fn test_envelope_success() {
        let json = r#"{
            "code": 200,
            "data": {
                "tweets": [{"text": "$BTC to the moon", "tweetId": "1", "likeCount": 12, "viewCount": 3400}],
                "answer": "long answer",
                "answerDS": "short answer",
                "isJson": false,
                "fromAllKol": true
            }
        }"#;
        let env: AnalysisEnvelope = serde_json::from_str(json).unwrap();
        let analysis = env.into_analysis().unwrap();
        assert_eq!(analysis.tweets.len(), 1);
        assert_eq!(analysis.tweets[0].tweet_id, "1");
        assert_eq!(analysis.tweets[0].view_count, 3400);
        assert_eq!(analysis.summary(), "short answer");
        assert!(analysis.from_all_kol);
    }

    #[test]
    fn test_envelope_not_found() {
        let env: AnalysisEnvelope =
            serde_json::from_str(r#"{"code": 404, "message": "not found"}"#).unwrap();
        assert!(env.into_analysis().is_none());

        let env: AnalysisEnvelope = serde_json::from_str(r#"{"code": 200}"#).unwrap();
        assert!(env.into_analysis().is_none());
    }

    #[test]
    fn test_summary_falls_back_to_answer() {
        let a = TokenAnalysis {
            answer: "fallback".into(),
            ..Default::default()
        };
        assert_eq!(a.summary(), "fallback");
    }

    #[test]
    fn test_tweet_serializes_camel_case() {
        let t = HoverTweet {
            tweet_id: "42".into(),
            like_count: 1,
            ..Default::default()
        };
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["tweetId"], "42");
        assert_eq!(v["likeCount"], 1);
    }
}
