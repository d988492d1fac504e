//! Document and chunk types with page tracking

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source file formats the loaders understand
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document, loaded page by page
    Pdf,
    /// Plain text file
    Txt,
    /// Markdown file
    Markdown,
    /// Anything else
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "txt" | "text" => Self::Txt,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a path's extension
    pub fn from_path(path: &std::path::Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }
}

/// Where a document's text came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Path of the source file
    pub source: String,
    /// Page index (0-based) for paginated sources
    pub page: Option<u32>,
}

/// One page (or whole file, for unpaginated sources) of loaded text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Text content
    pub page_content: String,
    /// Source metadata
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a document for one page of a paginated source
    pub fn page(source: impl Into<String>, page: u32, page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: DocumentMetadata {
                source: source.into(),
                page: Some(page),
            },
        }
    }

    /// Create a document for a whole unpaginated file
    pub fn whole(source: impl Into<String>, page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: DocumentMetadata {
                source: source.into(),
                page: None,
            },
        }
    }
}

/// A chunk of text from a document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Text content
    pub content: String,
    /// Path of the source file
    pub source: String,
    /// Page index of the parent document
    pub page: Option<u32>,
    /// Chunk index within the whole indexing run
    pub chunk_index: u32,
    /// Character offset of the chunk within its parent document
    pub start_index: usize,
}

impl Chunk {
    /// Create a new chunk from its parent document's metadata
    pub fn new(
        content: String,
        metadata: &DocumentMetadata,
        chunk_index: u32,
        start_index: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            source: metadata.source.clone(),
            page: metadata.page,
            chunk_index,
            start_index,
        }
    }

    /// Length of the content in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}
