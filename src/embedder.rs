//! Corpus and query embedding with an on-disk cache.
//!
//! The cache has three states: absent, computing, persisted. Once the file
//! exists it is loaded as-is on every run; there is no staleness check against
//! the document, so changing the document or the chunking requires deleting
//! the embedding cache file.

use crate::chunker::Chunk;
use crate::error::{RagError, Result};
use crate::llm::{EmbeddingService, TaskType};
use crate::persistence::{cache_exists, load, save};
use std::path::Path;
use tracing::{info, warn};

/// How the corpus embeddings were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Read from an existing cache file.
    Loaded,
    /// Computed with the embedding service and written to the cache file.
    Built,
}

/// A vector of `dimension` zeros, used when embedding a chunk fails.
pub fn zero_vector(dimension: usize) -> Vec<f32> {
    vec![0.0; dimension]
}

/// Embed every chunk one at a time.
///
/// A failed call, or a vector of the wrong dimension, gives that chunk a zero
/// vector instead of aborting the batch.
pub async fn embed_chunks<E: EmbeddingService>(
    service: &E,
    chunks: &[Chunk],
    dimension: usize,
) -> Vec<Vec<f32>> {
    let mut embeddings = Vec::with_capacity(chunks.len());

    for chunk in chunks {
        let vector = match service.embed(&chunk.text, TaskType::RetrievalDocument).await {
            Ok(vector) if vector.len() == dimension => vector,
            Ok(vector) => {
                warn!(
                    chunk = chunk.index,
                    expected = dimension,
                    got = vector.len(),
                    "embedding has wrong dimension, using zero vector"
                );
                zero_vector(dimension)
            }
            Err(e) => {
                warn!(chunk = chunk.index, error = %e, "embedding failed, using zero vector");
                zero_vector(dimension)
            }
        };
        embeddings.push(vector);
    }

    embeddings
}

/// Load the corpus embeddings from `path`, or compute and persist them.
///
/// A loaded cache must have one vector per chunk.
pub async fn load_or_build<E: EmbeddingService>(
    service: &E,
    chunks: &[Chunk],
    dimension: usize,
    path: &Path,
) -> Result<(Vec<Vec<f32>>, CacheState)> {
    if cache_exists(path) {
        let embeddings: Vec<Vec<f32>> = load(path)?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::CacheMismatch {
                path: path.to_path_buf(),
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }
        info!(path = %path.display(), count = embeddings.len(), "loaded embeddings from cache");
        return Ok((embeddings, CacheState::Loaded));
    }

    info!(count = chunks.len(), "creating embeddings, this takes a while");
    let embeddings = embed_chunks(service, chunks, dimension).await;
    save(&embeddings, path)?;
    info!(path = %path.display(), "embeddings cached");

    Ok((embeddings, CacheState::Built))
}

/// Embed a user question. Failures are returned to the caller.
pub async fn embed_query<E: EmbeddingService>(
    service: &E,
    query: &str,
    dimension: usize,
) -> Result<Vec<f32>> {
    let vector = service.embed(query, TaskType::RetrievalQuery).await?;
    if vector.len() != dimension {
        return Err(RagError::LlmParse(format!(
            "query embedding has dimension {}, expected {}",
            vector.len(),
            dimension
        )));
    }
    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockEmbedder;
    use tempfile::TempDir;

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(index, t)| Chunk {
                index,
                start: index,
                text: t.to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_failed_chunk_gets_zero_vector() {
        let embedder = MockEmbedder::new(|text| match text {
            "broken" => None,
            "short" => Some(vec![1.0]),
            _ => Some(vec![1.0, 2.0, 3.0]),
        });
        let chunks = chunks(&["fine", "broken", "short", "fine again"]);

        let embeddings = embed_chunks(&embedder, &chunks, 3).await;

        assert_eq!(embeddings.len(), 4);
        assert_eq!(embeddings[0], vec![1.0, 2.0, 3.0]);
        assert_eq!(embeddings[1], zero_vector(3));
        assert_eq!(embeddings[2], zero_vector(3));
        assert_eq!(embeddings[3], vec![1.0, 2.0, 3.0]);
        assert_eq!(embedder.document_calls(), 4);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_embedding_service() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("embeddings.bin");
        let chunks = chunks(&["a", "b", "c"]);

        let first = MockEmbedder::constant(vec![0.5, 0.5]);
        let (built, state) = load_or_build(&first, &chunks, 2, &path).await.unwrap();
        assert_eq!(state, CacheState::Built);
        assert_eq!(first.document_calls(), 3);

        let second = MockEmbedder::constant(vec![9.0, 9.0]);
        let (loaded, state) = load_or_build(&second, &chunks, 2, &path).await.unwrap();
        assert_eq!(state, CacheState::Loaded);
        assert_eq!(second.document_calls(), 0);
        assert_eq!(loaded, built);
    }

    #[tokio::test]
    async fn test_misaligned_cache_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("embeddings.bin");
        save(&vec![vec![1.0f32, 0.0]; 2], &path).unwrap();

        let embedder = MockEmbedder::constant(vec![1.0, 0.0]);
        let result = load_or_build(&embedder, &chunks(&["a", "b", "c"]), 2, &path).await;

        assert!(matches!(
            result,
            Err(RagError::CacheMismatch {
                chunks: 3,
                embeddings: 2,
                ..
            })
        ));
        assert_eq!(embedder.document_calls(), 0);
    }

    #[tokio::test]
    async fn test_query_uses_query_task_type_and_propagates_failure() {
        let embedder = MockEmbedder::new(|text| (text != "fail").then(|| vec![0.0, 1.0]));

        let vector = embed_query(&embedder, "question", 2).await.unwrap();
        assert_eq!(vector, vec![0.0, 1.0]);
        assert_eq!(embedder.query_calls(), 1);
        assert_eq!(embedder.document_calls(), 0);

        assert!(embed_query(&embedder, "fail", 2).await.is_err());
        assert!(embed_query(&embedder, "question", 3).await.is_err());
    }
}
