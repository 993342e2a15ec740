//! Doc RAG Chatbot - answers questions about a single document with Gemini.
//!
//! The document is split into overlapping character chunks, every chunk is
//! embedded once and cached on disk, and each question is answered from the
//! chunks whose embeddings are closest to the question's.
//!
//! # Quick Start
//!
//! ```no_run
//! use doc_rag_chatbot::{
//!     config::Config,
//!     document::Document,
//!     llm::GeminiClient,
//!     session::RagSession,
//! };
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     let client = GeminiClient::new(config.llm.clone());
//!     let document = Document::load(Path::new("thesis.pdf"))?;
//!
//!     // Chunks the document and loads or builds the embedding cache.
//!     let session = RagSession::open(config, &document, client.clone(), client).await?;
//!
//!     let answer = session.ask("Vad handlar examensarbetet om?").await?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Document**: page-based text extracted from a PDF or text file
//! - **chunker**: fixed-size overlapping character windows
//! - **embedder**: corpus embeddings with an on-disk cache
//! - **retriever**: exact cosine-similarity top-k search
//! - **Answerer**: grounded answer generation
//! - **eval**: graded evaluation against a validation set

pub mod answerer;
pub mod chat;
pub mod chunker;
pub mod config;
pub mod document;
pub mod embedder;
pub mod error;
pub mod eval;
pub mod llm;
pub mod persistence;
pub mod retriever;
pub mod session;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use answerer::Answerer;
pub use chunker::{Chunk, ChunkConfig, chunk_text};
pub use config::Config;
pub use document::Document;
pub use embedder::CacheState;
pub use error::{RagError, Result};
pub use llm::{GeminiClient, Language};
pub use retriever::{cosine_similarity, semantic_search};
pub use session::{RagSession, SearchHit};
