//! Source loaders: PDF page by page, plain text, and directories of both

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::{Document, FileType};

/// Something that turns a path into loaded documents
pub trait DocumentLoader {
    /// Load all documents from the configured location
    fn load(&self) -> Result<Vec<Document>>;
}

/// Load whatever `path` points at: a PDF, a text file, or a directory
pub fn load_source(path: &Path) -> Result<Vec<Document>> {
    let docs = if path.is_dir() {
        DirectoryLoader::new(path).load()?
    } else {
        match FileType::from_path(path) {
            FileType::Pdf => PdfLoader::new(path).load()?,
            FileType::Txt | FileType::Markdown => TextLoader::new(path).load()?,
            FileType::Unknown => {
                return Err(Error::source_load(
                    path.display().to_string(),
                    "unsupported file type",
                ))
            }
        }
    };

    if docs.iter().all(|d| d.page_content.trim().is_empty()) {
        return Err(Error::source_load(
            path.display().to_string(),
            "no text content could be extracted",
        ));
    }

    tracing::info!("Loaded {} documents from {}", docs.len(), path.display());
    Ok(docs)
}

/// PDF loader producing one document per page (0-based page index)
pub struct PdfLoader {
    path: PathBuf,
}

impl PdfLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse PDF bytes into page documents
    pub fn load_bytes(source: &str, data: &[u8]) -> Result<Vec<Document>> {
        match Self::extract_pages(data) {
            Ok(pages) => Ok(pages
                .into_iter()
                .map(|(page, text)| Document::page(source, page, cleanup_pdf_text(&text)))
                .collect()),
            Err(e) => {
                tracing::warn!("Page extraction failed for {}: {}, trying pdf-extract", source, e);
                let text = pdf_extract::extract_text_from_mem(data)
                    .map_err(|e| Error::source_load(source, format!("failed to parse PDF: {}", e)))?;

                // pdf-extract separates pages with form feeds
                Ok(text
                    .split('\u{000C}')
                    .enumerate()
                    .map(|(i, page)| Document::page(source, i as u32, cleanup_pdf_text(page)))
                    .collect())
            }
        }
    }

    fn extract_pages(data: &[u8]) -> std::result::Result<Vec<(u32, String)>, lopdf::Error> {
        let doc = lopdf::Document::load_mem(data)?;
        let pages = doc.get_pages();
        let mut out = Vec::with_capacity(pages.len());

        for page_num in pages.keys() {
            let text = match doc.extract_text(&[*page_num]) {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!("Could not extract text from page {}: {}", page_num, e);
                    String::new()
                }
            };
            out.push((page_num.saturating_sub(1), text));
        }

        Ok(out)
    }
}

impl DocumentLoader for PdfLoader {
    fn load(&self) -> Result<Vec<Document>> {
        let source = self.path.display().to_string();
        let data = std::fs::read(&self.path).map_err(|e| Error::source_load(&source, e.to_string()))?;
        Self::load_bytes(&source, &data)
    }
}

/// Plain text / markdown loader producing a single document
pub struct TextLoader {
    path: PathBuf,
}

impl TextLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentLoader for TextLoader {
    fn load(&self) -> Result<Vec<Document>> {
        let source = self.path.display().to_string();
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::source_load(&source, e.to_string()))?;
        Ok(vec![Document::whole(source, content)])
    }
}

/// Loads every supported file under a directory, in path order
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DocumentLoader for DirectoryLoader {
    fn load(&self) -> Result<Vec<Document>> {
        let mut docs = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            match FileType::from_path(path) {
                FileType::Pdf => docs.extend(PdfLoader::new(path).load()?),
                FileType::Txt | FileType::Markdown => docs.extend(TextLoader::new(path).load()?),
                FileType::Unknown => {
                    tracing::debug!("Skipping unsupported file {}", path.display());
                }
            }
        }

        Ok(docs)
    }
}

/// Normalise extracted PDF text: drop NULs, expand ligatures, trim line ends
fn cleanup_pdf_text(text: &str) -> String {
    text.replace('\0', "")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace('\u{00A0}', " ")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
