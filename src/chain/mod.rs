//! Read-only blockchain lookups.
//!
//! Defines the `ChainRpc` trait used by the tool server and the Solana
//! JSON-RPC implementation behind it.

pub mod solana;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::XHuntError;

/// Lamports carry 9 decimal places of SOL.
const SOL_DECIMALS: u32 = 9;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// On-chain account as returned by `getAccountInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub lamports: u64,
    pub owner: String,
    pub executable: bool,
    #[serde(default)]
    pub rent_epoch: u64,
    #[serde(default)]
    pub space: Option<u64>,
    /// Encoded account data, passed through untouched (`[data, encoding]`).
    #[serde(default)]
    pub data: serde_json::Value,
}

impl AccountInfo {
    pub fn sol(&self) -> Decimal {
        lamports_to_sol(self.lamports)
    }
}

/// Abstraction over read-only chain RPC endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// `Ok(None)` when the account does not exist.
    async fn account_info(&self, pubkey: &str) -> Result<Option<AccountInfo>>;

    /// Balance in lamports.
    async fn balance(&self, pubkey: &str) -> Result<u64>;

    /// Lamports needed to keep `bytes` of account data rent-exempt.
    async fn minimum_balance_for_rent_exemption(&self, bytes: u64) -> Result<u64>;
}

/// Exact lamports → SOL conversion.
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(lamports), SOL_DECIMALS).normalize()
}

/// Cheap shape check for a base58 public key before spending an RPC call.
pub fn validate_pubkey(pubkey: &str) -> Result<(), XHuntError> {
    if !(32..=44).contains(&pubkey.len()) {
        return Err(XHuntError::InvalidParams(format!(
            "publicKey must be 32-44 base58 characters, got {}",
            pubkey.len()
        )));
    }
    if let Some(bad) = pubkey.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
        return Err(XHuntError::InvalidParams(format!(
            "publicKey contains non-base58 character '{bad}'"
        )));
    }
    Ok(())
}
