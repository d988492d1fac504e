//! Response types for questions

use serde::{Deserialize, Serialize};

use crate::retrieval::ScoredChunk;

/// One retrieved chunk, as reported back to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// Path of the source file
    pub source: String,
    /// Page index, when paginated
    pub page: Option<u32>,
    /// Chunk text
    pub content: String,
    /// Cosine similarity to the question
    pub similarity: f32,
}

impl From<&ScoredChunk> for Source {
    fn from(scored: &ScoredChunk) -> Self {
        Self {
            source: scored.chunk.source.clone(),
            page: scored.chunk.page,
            content: scored.chunk.content.clone(),
            similarity: scored.similarity,
        }
    }
}

/// Body returned by `POST /api/ask`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    /// Generated answer
    pub answer: String,
    /// Retrieved chunks, only when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    /// Wall time spent answering
    pub processing_time_ms: u64,
}
