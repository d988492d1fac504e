//! Vector index and top-k retrieval

mod retriever;
mod store;

pub use retriever::Retriever;
pub use store::{cosine_similarity, InMemoryIndex, ScoredChunk, VectorIndex};
