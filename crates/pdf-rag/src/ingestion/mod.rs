//! Document ingestion: loading sources and splitting them into chunks

mod chunker;
mod loader;

pub use chunker::{RecursiveChunker, DEFAULT_SEPARATORS};
pub use loader::{load_source, DirectoryLoader, DocumentLoader, PdfLoader, TextLoader};
