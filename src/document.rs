//! Source document representation.
//!
//! A document is a list of pages. PDFs are extracted page by page; plain-text
//! files use form feeds as page breaks (the convention of `pdftotext`), or are
//! a single page when they contain none.

use crate::error::{RagError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Page separator in plain-text documents.
pub const PAGE_BREAK: char = '\x0c';

/// A single page in a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// 1-indexed page number.
    pub number: usize,
    /// Extracted text of the page.
    pub content: String,
}

impl Page {
    pub fn new(number: usize, content: String) -> Self {
        Self { number, content }
    }
}

/// A document consisting of one or more pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document name (file stem when loaded from disk).
    pub name: String,
    /// Original file path (if loaded from file).
    pub path: Option<PathBuf>,
    /// Pages in the document.
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new document with given name and pages.
    pub fn new(name: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            name: name.into(),
            path: None,
            pages,
        }
    }

    /// Create a single-page document from raw text.
    pub fn from_text(name: impl Into<String>, content: String) -> Self {
        Self::new(name, vec![Page::new(1, content)])
    }

    /// Load a document, choosing the loader from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RagError::DocumentNotFound(path.to_path_buf()));
        }

        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            Self::from_pdf(path)
        } else {
            Self::from_text_file(path)
        }
    }

    /// Extract the text of every page of a PDF.
    pub fn from_pdf(path: &Path) -> Result<Self> {
        let pdf = lopdf::Document::load(path).map_err(|e| RagError::Extraction {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut pages = Vec::new();
        for (index, page_number) in pdf.get_pages().keys().enumerate() {
            let text = pdf
                .extract_text(&[*page_number])
                .map_err(|e| RagError::Extraction {
                    path: path.to_path_buf(),
                    reason: format!("page {}: {}", page_number, e),
                })?;
            pages.push(Page::new(index + 1, text));
        }

        if pages.is_empty() {
            return Err(RagError::Extraction {
                path: path.to_path_buf(),
                reason: "document has no pages".to_string(),
            });
        }

        Ok(Self {
            name: file_stem(path),
            path: Some(path.to_path_buf()),
            pages,
        })
    }

    /// Load a text file, splitting pages on form feeds.
    pub fn from_text_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RagError::io(path, e))?;

        let pages = content
            .split(PAGE_BREAK)
            .enumerate()
            .map(|(i, s)| Page::new(i + 1, s.to_string()))
            .collect();

        Ok(Self {
            name: file_stem(path),
            path: Some(path.to_path_buf()),
            pages,
        })
    }

    /// Get total number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All page texts, each followed by a newline.
    pub fn full_text(&self) -> String {
        let mut text = String::new();
        for page in &self.pages {
            text.push_str(&page.content);
            text.push('\n');
        }
        text
    }

    /// Length of [`full_text`](Self::full_text) in characters.
    pub fn char_count(&self) -> usize {
        self.pages
            .iter()
            .map(|p| p.content.chars().count() + 1)
            .sum()
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string()
}
