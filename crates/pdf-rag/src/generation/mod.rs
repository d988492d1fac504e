//! Prompt construction and output parsing

pub mod context;
pub mod output;
pub mod prompt;

pub use context::format_context;
pub use output::StrOutputParser;
pub use prompt::{PromptTemplate, RAG_PROMPT};
