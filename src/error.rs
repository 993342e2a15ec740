//! Error types for the RAG chatbot.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, RagError>;

/// Errors that can occur anywhere in the retrieval pipeline.
#[derive(Error, Debug)]
pub enum RagError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The document path does not exist.
    #[error("Document not found at '{0}'")]
    DocumentNotFound(PathBuf),

    /// Text could not be extracted from the document.
    #[error("Failed to extract text from '{path}': {reason}")]
    Extraction { path: PathBuf, reason: String },

    /// Chunk length and overlap do not give a positive stride.
    #[error(
        "Invalid chunk configuration: size {size}, overlap {overlap} (overlap must be smaller than size)"
    )]
    InvalidChunkConfig { size: usize, overlap: usize },

    /// A cache file does not exist.
    #[error("Cache file not found at '{0}'")]
    CacheNotFound(PathBuf),

    /// The embedding cache is not aligned with the chunk list.
    #[error(
        "Embedding cache '{path}' holds {embeddings} vectors but the document has {chunks} chunks; delete the cache file to rebuild it"
    )]
    CacheMismatch {
        path: PathBuf,
        chunks: usize,
        embeddings: usize,
    },

    /// Configuration file or value error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Gemini API returned an error.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// Gemini response could not be parsed.
    #[error("Failed to parse LLM response: {0}")]
    LlmParse(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),
}

impl RagError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for RagError {
    fn from(err: reqwest::Error) -> Self {
        RagError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for RagError {
    fn from(err: serde_json::Error) -> Self {
        RagError::LlmParse(err.to_string())
    }
}
