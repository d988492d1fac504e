//! Vector index for chunk storage and nearest-neighbour search

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Chunk;

/// Search result with chunk and similarity
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Cosine similarity (-1.0 to 1.0, higher is more similar)
    pub similarity: f32,
}

/// Trait for vector storage and similarity search
///
/// Implementations:
/// - `InMemoryIndex`: brute-force cosine scan, optional JSON snapshot
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert chunks with their embeddings
    async fn add(&self, entries: Vec<(Chunk, Vec<f32>)>) -> Result<()>;

    /// Return up to `top_k` chunks in non-increasing similarity order
    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>>;

    /// Get total number of vectors stored
    async fn len(&self) -> Result<usize>;

    /// Check if index is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Get index name for logging
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

#[derive(Debug, Default)]
struct IndexState {
    dimensions: Option<usize>,
    entries: Vec<IndexEntry>,
}

/// On-disk form of an index
#[derive(Serialize, Deserialize)]
struct IndexSnapshot {
    fingerprint: String,
    dimensions: Option<usize>,
    entries: Vec<IndexEntry>,
}

/// In-memory vector index. Written once at build time, read concurrently afterwards.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    state: RwLock<IndexState>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embedding dimension, fixed by the first insert
    pub fn dimensions(&self) -> Option<usize> {
        self.state.read().dimensions
    }

    /// Write the index and the fingerprint of its source to `path`
    pub fn save(&self, path: &Path, fingerprint: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let state = self.state.read();
        let snapshot = IndexSnapshot {
            fingerprint: fingerprint.to_string(),
            dimensions: state.dimensions,
            entries: state.entries.clone(),
        };
        let json = serde_json::to_vec(&snapshot)?;
        std::fs::write(path, json)?;

        tracing::info!("Saved index with {} vectors to {}", state.entries.len(), path.display());
        Ok(())
    }

    /// Load a snapshot if it exists and was built from the same source
    pub fn load_if_fresh(path: &Path, fingerprint: &str) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read(path)?;
        let snapshot: IndexSnapshot = match serde_json::from_slice(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Ignoring unreadable index snapshot {}: {}", path.display(), e);
                return Ok(None);
            }
        };

        if snapshot.fingerprint != fingerprint {
            tracing::info!("Index snapshot {} is stale, rebuilding", path.display());
            return Ok(None);
        }

        Ok(Some(Self {
            state: RwLock::new(IndexState {
                dimensions: snapshot.dimensions,
                entries: snapshot.entries,
            }),
        }))
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn add(&self, entries: Vec<(Chunk, Vec<f32>)>) -> Result<()> {
        let Some(batch_dims) = validate_batch(&entries)? else {
            return Ok(());
        };

        // The batch is inserted whole or not at all
        let mut state = self.state.write();
        match state.dimensions {
            Some(dims) if dims != batch_dims => {
                return Err(Error::VectorIndex(format!(
                    "Dimension mismatch: index has {}, batch has {}",
                    dims, batch_dims
                )));
            }
            Some(_) => {}
            None => state.dimensions = Some(batch_dims),
        }

        state
            .entries
            .extend(entries.into_iter().map(|(chunk, vector)| IndexEntry { chunk, vector }));

        Ok(())
    }

    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        let state = self.state.read();

        if let Some(dims) = state.dimensions {
            if dims != query_embedding.len() {
                return Err(Error::VectorIndex(format!(
                    "Query has {} dimensions, index has {}",
                    query_embedding.len(),
                    dims
                )));
            }
        }

        if query_embedding.iter().any(|x| !x.is_finite()) {
            return Err(Error::VectorIndex("Query embedding has non-finite values".into()));
        }

        let mut results: Vec<ScoredChunk> = state
            .entries
            .iter()
            .map(|entry| {
                let similarity = cosine_similarity(query_embedding, &entry.vector);
                ScoredChunk {
                    chunk: entry.chunk.clone(),
                    // NaN or overflow ranks last
                    similarity: if similarity.is_finite() { similarity } else { f32::NEG_INFINITY },
                }
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        results.truncate(top_k);

        Ok(results)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.state.read().entries.len())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

/// Check a batch for empty, non-finite or mismatched vectors.
/// Returns the shared dimension, or `None` for an empty batch.
fn validate_batch(entries: &[(Chunk, Vec<f32>)]) -> Result<Option<usize>> {
    let Some((_, first)) = entries.first() else {
        return Ok(None);
    };
    let dims = first.len();

    for (chunk, vector) in entries {
        if vector.is_empty() {
            return Err(Error::VectorIndex(format!("Chunk {} has no embedding", chunk.id)));
        }
        if vector.len() != dims {
            return Err(Error::VectorIndex(format!(
                "Dimension mismatch in batch: expected {}, chunk {} has {}",
                dims,
                chunk.id,
                vector.len()
            )));
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(Error::VectorIndex(format!(
                "Chunk {} has a non-finite embedding value",
                chunk.id
            )));
        }
    }

    Ok(Some(dims))
}

/// Cosine similarity; zero vectors score 0.0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentMetadata;

    fn chunk(content: &str) -> Chunk {
        let meta = DocumentMetadata {
            source: "hours.pdf".to_string(),
            page: Some(0),
        };
        Chunk::new(content.to_string(), &meta, 0, 0)
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_search_orders_and_truncates() {
        let index = InMemoryIndex::new();
        index
            .add(vec![
                (chunk("far"), vec![0.0, 1.0]),
                (chunk("near"), vec![1.0, 0.1]),
                (chunk("middle"), vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = index.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "near");
        assert_eq!(results[1].chunk.content, "middle");
        assert!(results[0].similarity >= results[1].similarity);

        // Fewer entries than k: everything comes back, no threshold
        let results = index.search(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[2].chunk.content, "far");
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let index = InMemoryIndex::new();
        index
            .add(vec![
                (chunk("first"), vec![1.0, 0.0]),
                (chunk("second"), vec![2.0, 0.0]),
            ])
            .await
            .unwrap();

        let results = index.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results[0].chunk.content, "first");
        assert_eq!(results[1].chunk.content, "second");
    }

    #[tokio::test]
    async fn test_dimension_checks() {
        let index = InMemoryIndex::new();
        index.add(vec![(chunk("a"), vec![1.0, 0.0])]).await.unwrap();

        assert!(index.add(vec![(chunk("b"), vec![1.0])]).await.is_err());
        assert!(index.add(vec![(chunk("c"), vec![])]).await.is_err());
        assert!(index.search(&[1.0, 0.0, 0.0], 1).await.is_err());
    }

    #[tokio::test]
    async fn test_rejected_batch_leaves_index_untouched() {
        let index = InMemoryIndex::new();
        let err = index
            .add(vec![
                (chunk("good"), vec![1.0, 0.0]),
                (chunk("short"), vec![1.0]),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::VectorIndex(_)));
        assert_eq!(index.len().await.unwrap(), 0);
        assert_eq!(index.dimensions(), None);

        index.add(vec![(chunk("a"), vec![1.0, 0.0])]).await.unwrap();
        assert!(index
            .add(vec![
                (chunk("b"), vec![0.0, 1.0]),
                (chunk("c"), vec![0.0, 1.0, 0.0]),
            ])
            .await
            .is_err());
        assert_eq!(index.len().await.unwrap(), 1);
        assert_eq!(index.dimensions(), Some(2));
    }

    #[tokio::test]
    async fn test_non_finite_vectors_are_rejected() {
        let index = InMemoryIndex::new();
        index.add(vec![(chunk("hours"), vec![1.0, 0.0])]).await.unwrap();

        assert!(index.add(vec![(chunk("nan"), vec![f32::NAN, 1.0])]).await.is_err());
        assert!(index.add(vec![(chunk("inf"), vec![f32::INFINITY, 1.0])]).await.is_err());
        assert_eq!(index.len().await.unwrap(), 1);

        assert!(index.search(&[f32::NAN, 0.0], 1).await.is_err());

        let results = index.search(&[1.0, 0.0], 4).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.content, "hours");
    }

    #[tokio::test]
    async fn test_overflowing_similarity_ranks_last() {
        let index = InMemoryIndex::new();
        index
            .add(vec![
                (chunk("huge"), vec![f32::MAX, f32::MAX]),
                (chunk("hours"), vec![1.0, 0.1]),
            ])
            .await
            .unwrap();

        // Dot product and norm both overflow, so the raw score is NaN
        let results = index.search(&[2.0, 0.0], 2).await.unwrap();
        assert_eq!(results[0].chunk.content, "hours");
        assert_eq!(results[1].chunk.content, "huge");
        assert_eq!(results[1].similarity, f32::NEG_INFINITY);
    }

    #[tokio::test]
    async fn test_empty_index_returns_nothing() {
        let index = InMemoryIndex::new();
        assert!(index.is_empty().await.unwrap());
        assert!(index.search(&[1.0, 0.0], 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_reuse_and_staleness() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("index.json");

        let index = InMemoryIndex::new();
        index.add(vec![(chunk("kept"), vec![0.5, 0.5])]).await.unwrap();
        index.save(&path, "abc").unwrap();

        let loaded = InMemoryIndex::load_if_fresh(&path, "abc").unwrap().unwrap();
        assert_eq!(loaded.len().await.unwrap(), 1);
        assert_eq!(loaded.dimensions(), Some(2));

        assert!(InMemoryIndex::load_if_fresh(&path, "other").unwrap().is_none());
        assert!(InMemoryIndex::load_if_fresh(&dir.path().join("missing.json"), "abc")
            .unwrap()
            .is_none());
    }
}
