//! One-shot index build: chunk, embed in batches, insert

use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::config::VectorDbConfig;
use crate::error::{Error, Result};
use crate::ingestion::RecursiveChunker;
use crate::providers::EmbeddingProvider;
use crate::retrieval::{InMemoryIndex, VectorIndex};
use crate::types::{Chunk, Document};

/// What an index build did
#[derive(Debug, Clone, Default)]
pub struct IndexReport {
    /// Documents read from the source
    pub documents: usize,
    /// Chunks stored in the index
    pub chunks: usize,
    /// Whether a saved snapshot was reused instead of embedding
    pub reused_snapshot: bool,
    /// Hash of the source text and chunking parameters
    pub fingerprint: String,
}

/// Batch index builder
pub struct Indexer {
    chunker: RecursiveChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl Indexer {
    pub fn new(chunker: RecursiveChunker, embedder: Arc<dyn EmbeddingProvider>, batch_size: usize) -> Self {
        Self {
            chunker,
            embedder,
            batch_size: batch_size.max(1),
        }
    }

    /// Chunk `docs`, embed every chunk and insert the pairs into `index`
    pub async fn build(&self, docs: &[Document], index: &dyn VectorIndex) -> Result<IndexReport> {
        let chunks = self.chunker.split_documents(docs);
        tracing::info!("Split {} documents into {} chunks", docs.len(), chunks.len());

        let stored = self.index_chunks(chunks, index).await?;

        Ok(IndexReport {
            documents: docs.len(),
            chunks: stored,
            reused_snapshot: false,
            fingerprint: self.fingerprint(docs),
        })
    }

    /// Embed already-split chunks and insert them
    pub async fn index_chunks(&self, chunks: Vec<Chunk>, index: &dyn VectorIndex) -> Result<usize> {
        let total = chunks.len();

        for (batch_no, batch) in chunks.chunks(self.batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;

            if vectors.len() != batch.len() {
                return Err(Error::embedding(format!(
                    "Embedder returned {} vectors for {} chunks",
                    vectors.len(),
                    batch.len()
                )));
            }

            index
                .add(batch.iter().cloned().zip(vectors).collect())
                .await?;

            tracing::debug!(
                "Indexed batch {} ({}/{} chunks)",
                batch_no + 1,
                (batch_no * self.batch_size + batch.len()).min(total),
                total
            );
        }

        Ok(total)
    }

    /// Build into a fresh in-memory index, reusing or writing a snapshot when persistence is on
    pub async fn build_persistent(
        &self,
        docs: &[Document],
        vector_db: &VectorDbConfig,
    ) -> Result<(InMemoryIndex, IndexReport)> {
        let fingerprint = self.fingerprint(docs);

        if vector_db.persist {
            if let Some(index) = InMemoryIndex::load_if_fresh(&vector_db.persist_path, &fingerprint)? {
                let chunks = index.len().await?;
                tracing::info!(
                    "Reusing index from {} ({} chunks)",
                    vector_db.persist_path.display(),
                    chunks
                );
                return Ok((
                    index,
                    IndexReport {
                        documents: docs.len(),
                        chunks,
                        reused_snapshot: true,
                        fingerprint,
                    },
                ));
            }
        }

        let index = InMemoryIndex::new();
        let report = self.build(docs, &index).await?;

        if vector_db.persist {
            index.save(&vector_db.persist_path, &report.fingerprint)?;
        }

        Ok((index, report))
    }

    /// Hash of everything that determines the index contents
    pub fn fingerprint(&self, docs: &[Document]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.embedder.model().as_bytes());
        hasher.update(self.chunker.chunk_size().to_le_bytes());
        hasher.update(self.chunker.overlap().to_le_bytes());

        for doc in docs {
            hasher.update(doc.metadata.source.as_bytes());
            hasher.update([0u8]);
            hasher.update(doc.metadata.page.map(|p| p as i64).unwrap_or(-1).to_le_bytes());
            hasher.update(doc.page_content.as_bytes());
            hasher.update([0u8]);
        }

        hex::encode(hasher.finalize())
    }
}
