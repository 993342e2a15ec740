//! The pipeline context: document chunks, their embeddings and the services.
//!
//! Construction follows a fixed order: chunk the document text, persist the
//! chunk list, then load or build the embedding cache. Every question goes
//! through embed query → rank → generate with no state kept between questions.

use crate::answerer::Answerer;
use crate::chunker::{Chunk, ChunkConfig, chunk_text};
use crate::config::Config;
use crate::document::Document;
use crate::embedder::{CacheState, embed_query, load_or_build};
use crate::error::Result;
use crate::llm::{EmbeddingService, GenerationService, Prompts};
use crate::persistence::save;
use crate::retriever::{self, ScoredChunk};
use tracing::info;

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub index: usize,
    pub score: Option<f32>,
    pub text: String,
}

/// Loaded document index plus the services used to query it.
pub struct RagSession<E, G> {
    config: Config,
    document_name: String,
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
    cache_state: CacheState,
    embedder: E,
    generator: G,
}

impl<E: EmbeddingService, G: GenerationService> RagSession<E, G> {
    /// Chunk `document` and load or build its embeddings.
    pub async fn open(
        config: Config,
        document: &Document,
        embedder: E,
        generator: G,
    ) -> Result<Self> {
        let chunk_config = ChunkConfig::new(config.rag.chunk_size, config.rag.chunk_overlap);
        let chunks = chunk_text(&document.full_text(), &chunk_config)?;
        info!(
            document = %document.name,
            pages = document.page_count(),
            chunks = chunks.len(),
            "document chunked"
        );

        save(&chunks, &config.cache.chunks_path())?;

        let (embeddings, cache_state) = load_or_build(
            &embedder,
            &chunks,
            config.llm.embedding_dimension,
            &config.cache.embeddings_path(),
        )
        .await?;

        Ok(Self {
            config,
            document_name: document.name.clone(),
            chunks,
            embeddings,
            cache_state,
            embedder,
            generator,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    pub fn cache_state(&self) -> CacheState {
        self.cache_state
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn prompts(&self) -> Prompts {
        Prompts::new(self.config.rag.language)
    }

    /// Rank every chunk against `question` and return the best `k` with scores.
    pub async fn search(&self, question: &str, k: usize) -> Result<Vec<SearchHit>> {
        let query = embed_query(
            &self.embedder,
            question,
            self.config.llm.embedding_dimension,
        )
        .await?;

        let hits = retriever::rank(&query, &self.embeddings)
            .into_iter()
            .take(k)
            .filter_map(|ScoredChunk { index, score }| {
                self.chunks.get(index).map(|chunk| SearchHit {
                    index,
                    score,
                    text: chunk.text.clone(),
                })
            })
            .collect();

        Ok(hits)
    }

    /// Texts of the configured top-k chunks for `question`.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<String>> {
        let query = embed_query(
            &self.embedder,
            question,
            self.config.llm.embedding_dimension,
        )
        .await?;

        Ok(retriever::semantic_search(
            &query,
            &self.chunks,
            &self.embeddings,
            self.config.rag.top_k,
        ))
    }

    /// Answer `question` from the retrieved context.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let context = self.retrieve(question).await?;
        Answerer::new(&self.generator, self.prompts())
            .answer(question, &context)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RagError;
    use crate::persistence::load;
    use crate::test_support::{MockEmbedder, MockGenerator};
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> Config {
        let mut config = Config::with_api("http://localhost", "key");
        config.llm.embedding_dimension = 3;
        config.rag.chunk_size = 10;
        config.rag.chunk_overlap = 0;
        config.rag.top_k = 1;
        config.cache.dir = dir.path().to_path_buf();
        config
    }

    // One axis per topic; anything else points along the third axis.
    fn axis_embedder() -> MockEmbedder {
        MockEmbedder::new(|text| {
            let vector = if text.starts_with("hiss") || text.contains("elevator") {
                vec![1.0, 0.0, 0.0]
            } else if text.starts_with("spel") || text.contains("game") {
                vec![0.0, 1.0, 0.0]
            } else {
                vec![0.0, 0.0, 1.0]
            };
            Some(vector)
        })
    }

    async fn open(
        dir: &TempDir,
        generator: MockGenerator,
    ) -> RagSession<MockEmbedder, MockGenerator> {
        RagSession::open(test_config(dir), &document(), axis_embedder(), generator)
            .await
            .unwrap()
    }

    fn document() -> Document {
        // full_text appends a newline, which lands in a fourth one-character chunk.
        Document::from_text("thesis", "hiss......spel......bevis.....".to_string())
    }

    #[tokio::test]
    async fn test_open_builds_then_reuses_cache() {
        let dir = TempDir::new().unwrap();

        let session = open(&dir, MockGenerator::failing()).await;
        assert_eq!(session.cache_state(), CacheState::Built);
        assert_eq!(session.chunks().len(), 4);
        assert_eq!(session.embeddings().len(), 4);
        assert_eq!(session.embedder().document_calls(), 4);

        let saved: Vec<Chunk> = load(&test_config(&dir).cache.chunks_path()).unwrap();
        assert_eq!(saved, session.chunks());

        let reopened = open(&dir, MockGenerator::failing()).await;
        assert_eq!(reopened.cache_state(), CacheState::Loaded);
        assert_eq!(reopened.embedder().document_calls(), 0);
        assert_eq!(reopened.embeddings(), session.embeddings());
    }

    #[tokio::test]
    async fn test_retrieve_returns_closest_chunk() {
        let dir = TempDir::new().unwrap();
        let session = open(&dir, MockGenerator::failing()).await;

        let context = session.retrieve("which game?").await.unwrap();
        assert_eq!(context, vec!["spel......".to_string()]);
        assert_eq!(session.embedder().query_calls(), 1);

        let hits = session.search("which elevator?", 2).await.unwrap();
        assert_eq!(hits[0].index, 0);
        assert!((hits[0].score.unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_ask_sends_context_and_question() {
        let dir = TempDir::new().unwrap();
        let session = open(&dir, MockGenerator::scripted(["Det handlar om spel."])).await;

        let answer = session.ask("Vilket game?").await.unwrap();
        assert_eq!(answer, "Det handlar om spel.");

        let prompts = session.generator().prompts();
        assert!(prompts[0].contains("spel......"));
        assert!(!prompts[0].contains("hiss......"));
        assert!(prompts[0].contains("FRÅGA: Vilket game?"));
    }

    #[tokio::test]
    async fn test_invalid_chunk_config_fails_before_embedding() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.rag.chunk_overlap = 10;

        let result =
            RagSession::open(config, &document(), axis_embedder(), MockGenerator::failing()).await;
        assert!(matches!(result, Err(RagError::InvalidChunkConfig { .. })));
    }
}
