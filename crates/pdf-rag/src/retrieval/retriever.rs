//! Top-k retrieval: embed the query, search the index

use std::sync::Arc;

use crate::error::Result;
use crate::providers::EmbeddingProvider;

use super::store::{ScoredChunk, VectorIndex};

/// Wraps an embedder and a vector index behind "top-k chunks for a query"
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            top_k,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Return at most `top_k` chunks, most similar first. No similarity floor.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        let query_embedding = self.embedder.embed(query).await?;
        let results = self.index.search(&query_embedding, self.top_k).await?;

        tracing::debug!(
            "Retrieved {} chunks (k={}), best similarity {:?}",
            results.len(),
            self.top_k,
            results.first().map(|r| r.similarity)
        );

        Ok(results)
    }
}
