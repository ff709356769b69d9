//! Shared fixtures for integration tests.
//!
//! Deterministic in-memory implementations of the backend traits, plus a
//! small page layout for the hover scenarios. Nothing here touches the
//! network.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use xhunt::analysis::{HoverTweet, TickerAnalysisSource, TokenAnalysis};
use xhunt::chain::{AccountInfo, ChainRpc};
use xhunt::hover::{Node, Scene};
use xhunt::mcp::{build_router, McpHandler, McpState, ToolRegistry};
use xhunt::types::{ElementId, Point, Rect};

// ---------------------------------------------------------------------------
// Analysis backend
// ---------------------------------------------------------------------------

/// Knows a fixed set of tickers and records every lookup.
pub struct MockAnalysis {
    known: HashMap<String, TokenAnalysis>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    /// If set, every lookup fails with this message.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockAnalysis {
    pub fn new() -> Self {
        let mut known = HashMap::new();
        known.insert(
            "$BTC".to_string(),
            TokenAnalysis {
                answer: "Long-form BTC analysis".to_string(),
                answer_ds: "KOLs are broadly bullish on BTC".to_string(),
                tweets: vec![HoverTweet {
                    text: "$BTC breaking out".to_string(),
                    username: "satoshi_fan".to_string(),
                    tweet_id: "1790000000000000001".to_string(),
                    like_count: 1200,
                    ..Default::default()
                }],
                ..Default::default()
            },
        );
        Self {
            known,
            calls: Arc::new(Mutex::new(Vec::new())),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TickerAnalysisSource for MockAnalysis {
    async fn analyze(&self, ticker: &str, contract_address: &str) -> Result<Option<TokenAnalysis>> {
        self.calls
            .lock()
            .unwrap()
            .push((ticker.to_string(), contract_address.to_string()));
        if let Some(msg) = self.force_error.lock().unwrap().clone() {
            return Err(anyhow!(msg));
        }
        let key = if ticker.starts_with('$') {
            ticker.to_uppercase()
        } else {
            format!("${}", ticker.to_uppercase())
        };
        Ok(self.known.get(&key).cloned())
    }
}

// ---------------------------------------------------------------------------
// Chain backend
// ---------------------------------------------------------------------------

pub const FUNDED_WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
pub const EMPTY_WALLET: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";

/// One funded system account; rent is the mainnet formula.
pub struct MockChain;

impl MockChain {
    const LAMPORTS_PER_BYTE_YEAR: u64 = 3_480;
    const ACCOUNT_STORAGE_OVERHEAD: u64 = 128;
    const EXEMPTION_YEARS: u64 = 2;
}

#[async_trait]
impl ChainRpc for MockChain {
    async fn account_info(&self, pubkey: &str) -> Result<Option<AccountInfo>> {
        Ok((pubkey == FUNDED_WALLET).then(|| AccountInfo {
            lamports: 2_500_000_000,
            owner: "11111111111111111111111111111111".to_string(),
            executable: false,
            rent_epoch: 18_446_744_073_709_551_615,
            space: Some(0),
            data: Value::Array(vec![Value::from(""), Value::from("base64")]),
        }))
    }

    async fn balance(&self, pubkey: &str) -> Result<u64> {
        Ok(if pubkey == FUNDED_WALLET { 2_500_000_000 } else { 0 })
    }

    async fn minimum_balance_for_rent_exemption(&self, bytes: u64) -> Result<u64> {
        Ok((bytes + Self::ACCOUNT_STORAGE_OVERHEAD)
            * Self::LAMPORTS_PER_BYTE_YEAR
            * Self::EXEMPTION_YEARS)
    }
}

/// Router wired to the mock backends.
pub fn test_router(analysis: Arc<MockAnalysis>) -> axum::Router {
    let tools = ToolRegistry::new(analysis, Arc::new(MockChain));
    let handler = McpHandler::new(tools, "XHunt-MCP-Server", "1.0.0");
    build_router(Arc::new(McpState::new(handler)))
}

// ---------------------------------------------------------------------------
// Page layout
// ---------------------------------------------------------------------------

pub const PAGE: ElementId = ElementId(1);
pub const TWEET_BODY: ElementId = ElementId(10);
pub const BTC_LINK: ElementId = ElementId(11);
pub const WIF_TWEET: ElementId = ElementId(20);
pub const PRICE_TWEET: ElementId = ElementId(30);

pub const BTC_RECT: Rect = Rect {
    left: 120.0,
    top: 200.0,
    right: 170.0,
    bottom: 220.0,
    width: 50.0,
    height: 20.0,
};

/// A timeline with a tweet whose `$BTC` sits in a nested link, a tweet
/// mentioning `$WIF` in its own text, and a tweet with only a price.
pub fn timeline() -> Arc<Scene> {
    let scene = Arc::new(Scene::new());
    scene.insert(PAGE, Rect::new(0.0, 0.0, 1280.0, 2000.0), vec![]);
    scene.insert(
        TWEET_BODY,
        Rect::new(100.0, 190.0, 500.0, 60.0),
        vec![
            Node::Text("Watching ".to_string()),
            Node::Element(BTC_LINK),
            Node::Text(" into the close".to_string()),
        ],
    );
    scene.insert_text(BTC_LINK, BTC_RECT, "$BTC");
    scene.insert_text(
        WIF_TWEET,
        Rect::new(100.0, 400.0, 500.0, 40.0),
        "dog szn: $WIF and friends",
    );
    scene.insert_text(
        PRICE_TWEET,
        Rect::new(100.0, 600.0, 500.0, 40.0),
        "bought the dip at $100 lol",
    );
    scene
}

pub fn over_btc() -> Point {
    Point::new(140.0, 210.0)
}

pub fn over_tweet_text() -> Point {
    Point::new(400.0, 240.0)
}

pub fn over_wif() -> Point {
    Point::new(300.0, 420.0)
}

pub fn over_price() -> Point {
    Point::new(300.0, 620.0)
}

pub fn over_blank() -> Point {
    Point::new(1000.0, 1500.0)
}
