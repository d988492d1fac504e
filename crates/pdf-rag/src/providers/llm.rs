//! LLM provider trait and chat message types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Speaker of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One turn of a chat prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

/// Token accounting reported by the generator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Generator output: text plus metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    /// Generated text
    pub text: String,
    /// Model that produced it
    pub model: String,
    /// Why generation stopped ("stop", "length", ...)
    pub finish_reason: Option<String>,
    /// Token usage, when reported
    pub usage: Option<TokenUsage>,
}

/// Trait for chat-completion answer generation
///
/// Implementations:
/// - `GroqClient`: hosted Groq chat-completions API
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for a chat prompt
    async fn generate(&self, messages: &[ChatMessage]) -> Result<Generation>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
