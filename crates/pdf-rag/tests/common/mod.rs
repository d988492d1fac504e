//! Stub providers shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use pdf_rag::error::{Error, Result};
use pdf_rag::providers::{ChatMessage, EmbeddingProvider, Generation, LlmProvider};

/// Keyword embedder: one axis per topic, so similarity is predictable.
pub struct KeywordEmbedder;

const TOPICS: [&str; 4] = ["hours", "return", "parking", "contact"];

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> = TOPICS
            .iter()
            .map(|topic| if lower.contains(topic) { 1.0 } else { 0.0 })
            .collect();
        // Background axis keeps every vector non-zero
        vector.push(0.1);
        Ok(vector)
    }

    fn name(&self) -> &str {
        "keyword"
    }

    fn model(&self) -> &str {
        "keyword-v1"
    }
}

/// Embedder that always fails, as an unreachable service would.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::embedding("connection refused"))
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn model(&self) -> &str {
        "failing"
    }
}

/// Generator that returns the rendered prompt verbatim.
pub struct EchoLlm;

#[async_trait]
impl LlmProvider for EchoLlm {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<Generation> {
        Ok(Generation {
            text: messages
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            model: "echo".to_string(),
            finish_reason: Some("stop".to_string()),
            usage: None,
        })
    }

    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo-v1"
    }
}

/// Generator that always fails.
pub struct FailingLlm;

#[async_trait]
impl LlmProvider for FailingLlm {
    async fn generate(&self, _messages: &[ChatMessage]) -> Result<Generation> {
        Err(Error::generation("model overloaded"))
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn model(&self) -> &str {
        "failing"
    }
}
