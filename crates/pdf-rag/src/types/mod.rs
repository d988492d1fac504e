//! Core types for the RAG system

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, Document, DocumentMetadata, FileType};
pub use query::AskRequest;
pub use response::{AskResponse, Source};
