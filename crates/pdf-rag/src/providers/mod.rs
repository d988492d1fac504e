//! Provider abstractions for embeddings and chat generation
//!
//! The pipeline only sees the traits; the hosted Jina and Groq clients are
//! one implementation each, and tests plug in stubs.

pub mod embedding;
pub mod groq;
pub mod jina;
pub mod llm;
pub mod retry;

pub use embedding::EmbeddingProvider;
pub use groq::GroqClient;
pub use jina::JinaEmbedder;
pub use llm::{ChatMessage, ChatRole, Generation, LlmProvider, TokenUsage};
pub use retry::RetryPolicy;
