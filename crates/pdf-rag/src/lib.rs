//! pdf-rag: retrieval-augmented question answering over a PDF document
//!
//! At startup the source document is loaded page by page, split with a
//! recursive character splitter, embedded through the Jina embeddings API and
//! held in an in-memory vector index. Each question is answered by retrieving
//! the closest chunks, filling a prompt template and asking a Groq-hosted
//! chat model. The pipeline is exposed over HTTP (`POST /api/ask`) and as a
//! one-shot CLI.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod telemetry;
pub mod types;

pub use config::{Credentials, RagConfig};
pub use error::{Error, Result};
pub use pipeline::{IndexReport, Indexer, RagOutput, RagPipeline};
pub use server::RagServer;
pub use types::{AskRequest, AskResponse, Chunk, Document, DocumentMetadata, Source};
