//! Recursive character text splitting with overlap and start offsets

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

/// Separators tried in order: paragraph, line, word, character
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Text chunker that prefers natural breaks and falls back to finer ones
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    overlap: usize,
    /// Separators, coarsest first
    separators: Vec<String>,
}

impl RecursiveChunker {
    /// Create a new chunker with the default separators
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        Self::with_separators(chunk_size, overlap, DEFAULT_SEPARATORS)
    }

    /// Create a chunker with a custom separator list.
    ///
    /// Without a trailing `""` separator, a unit that is still longer than
    /// `chunk_size` after the last separator is emitted as an oversized chunk.
    pub fn with_separators(chunk_size: usize, overlap: usize, separators: &[&str]) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk size must be positive".into()));
        }
        if overlap >= chunk_size {
            return Err(Error::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, chunk_size
            )));
        }
        if separators.is_empty() {
            return Err(Error::Config("at least one separator is required".into()));
        }

        Ok(Self {
            chunk_size,
            overlap,
            separators: separators.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split every document, carrying its metadata onto the chunks
    pub fn split_documents(&self, docs: &[Document]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for doc in docs {
            let mut search_from = 0usize;
            let mut previous_len = 0usize;

            for piece in self.split_text(&doc.page_content) {
                let hint = (search_from + previous_len).saturating_sub(self.overlap);
                let start = find_char_offset(&doc.page_content, &piece, hint)
                    .or_else(|| find_char_offset(&doc.page_content, &piece, 0))
                    .unwrap_or(hint);

                search_from = start;
                previous_len = piece.chars().count();

                let index = chunks.len() as u32;
                chunks.push(Chunk::new(piece, &doc.metadata, index, start));
            }
        }

        tracing::debug!("Split {} documents into {} chunks", docs.len(), chunks.len());
        chunks
    }

    /// Split raw text into chunks
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let separators: Vec<&str> = self.separators.iter().map(String::as_str).collect();
        self.split_recursive(text, &separators)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        // Pick the first separator that occurs; "" always does
        let mut separator = separators[separators.len() - 1];
        let mut remaining: &[&str] = &[];
        for (i, &sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = sep;
                break;
            }
            if text.contains(sep) {
                separator = sep;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut good_splits: Vec<&str> = Vec::new();
        for piece in split_keep_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                good_splits.push(piece);
                continue;
            }

            if !good_splits.is_empty() {
                final_chunks.extend(self.merge_splits(&good_splits));
                good_splits.clear();
            }

            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    final_chunks.push(trimmed.to_string());
                }
            } else {
                final_chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits));
        }

        final_chunks
    }

    /// Greedily pack splits into chunks, carrying a tail of up to `overlap`
    /// characters into the next chunk
    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut window: std::collections::VecDeque<&str> = std::collections::VecDeque::new();
        let mut total = 0usize;

        for split in splits {
            let len = char_len(split);

            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total,
                        self.chunk_size
                    );
                }

                if !window.is_empty() {
                    if let Some(doc) = join_window(&window) {
                        docs.push(doc);
                    }

                    while total > self.overlap || (total + len > self.chunk_size && total > 0) {
                        match window.pop_front() {
                            Some(front) => total -= char_len(front),
                            None => break,
                        }
                    }
                }
            }

            window.push_back(split);
            total += len;
        }

        if let Some(doc) = join_window(&window) {
            docs.push(doc);
        }

        docs
    }
}

/// Split `text` on `separator`, attaching each separator to the piece after it.
/// The empty separator splits into single characters.
fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0usize;
    for (pos, _) in text.match_indices(separator) {
        if pos > start {
            pieces.push(&text[start..pos]);
        }
        start = pos;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }

    pieces.into_iter().filter(|p| !p.is_empty()).collect()
}

fn join_window(window: &std::collections::VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Find `needle` in `haystack` at or after character offset `from`,
/// returning a character offset
fn find_char_offset(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let byte_from = haystack
        .char_indices()
        .nth(from)
        .map(|(i, _)| i)
        .unwrap_or(haystack.len());

    haystack[byte_from..]
        .find(needle)
        .map(|pos| from + haystack[byte_from..byte_from + pos].chars().count())
}
