//! Groq chat-completions client (OpenAI-compatible API)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::llm::{ChatMessage, Generation, LlmProvider, TokenUsage};
use super::retry::RetryPolicy;

/// Hosted Groq chat client with automatic retry
pub struct GroqClient {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl GroqClient {
    /// Create a new Groq client
    pub fn new(config: &LlmConfig, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: format!(
                "{}/openai/v1/chat/completions",
                config.base_url.trim_end_matches('/')
            ),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            retry: RetryPolicy::new(config.max_retries, Duration::from_millis(config.retry_base_ms)),
        })
    }

    async fn request(&self, messages: &[ChatMessage]) -> Result<Generation> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::generation_http(&e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation_status(status, &body));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("Failed to parse completion response: {}", e)))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::generation("Completion response had no choices"))?;

        Ok(Generation {
            text: choice.message.content.unwrap_or_default(),
            model: parsed.model.unwrap_or_else(|| self.model.clone()),
            finish_reason: choice.finish_reason,
            usage: parsed.usage,
        })
    }
}

#[async_trait]
impl LlmProvider for GroqClient {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<Generation> {
        tracing::info!("Generating answer with model: {}", self.model);

        let generation = self.retry.run("Generation request", || self.request(messages)).await?;

        if let Some(usage) = &generation.usage {
            tracing::debug!(
                "Generation used {} prompt + {} completion tokens (finish: {:?})",
                usage.prompt_tokens,
                usage.completion_tokens,
                generation.finish_reason
            );
        }

        Ok(generation)
    }

    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
