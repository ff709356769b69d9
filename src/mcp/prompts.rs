//! MCP prompts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::protocol::Content;
use super::tools::GET_RENT_EXEMPTION;
use crate::types::XHuntError;

pub const CALCULATE_STORAGE_DEPOSIT: &str = "calculate-storage-deposit";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    pub description: String,
    pub required: bool,
}

/// Prompt metadata for `prompts/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub name: String,
    pub description: String,
    pub arguments: Vec<PromptArgument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: Content,
}

/// Result of `prompts/get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub messages: Vec<PromptMessage>,
}

pub fn prompt_definitions() -> Vec<Prompt> {
    vec![Prompt {
        name: CALCULATE_STORAGE_DEPOSIT.to_string(),
        description: "Calculate the SOL deposit needed to store a given number of bytes on Solana"
            .to_string(),
        arguments: vec![PromptArgument {
            name: "bytes".to_string(),
            description: "Number of bytes to store".to_string(),
            required: true,
        }],
    }]
}

/// Render prompt `name` with `arguments`.
pub fn get_prompt(name: &str, arguments: &Value) -> Result<PromptResult, XHuntError> {
    match name {
        CALCULATE_STORAGE_DEPOSIT => {
            let bytes = match arguments.get("bytes") {
                Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
                Some(Value::Number(n)) => n.to_string(),
                _ => {
                    return Err(XHuntError::InvalidParams(
                        "missing argument 'bytes'".to_string(),
                    ))
                }
            };
            Ok(PromptResult {
                description: None,
                messages: vec![PromptMessage {
                    role: "user".to_string(),
                    content: Content::text(format!(
                        "Calculate the SOL amount needed to store {bytes} bytes of data on Solana using {GET_RENT_EXEMPTION}."
                    )),
                }],
            })
        }
        other => Err(XHuntError::UnknownPrompt(other.to_string())),
    }
}
