//! Exact cosine-similarity search over all chunk vectors.

use crate::chunker::Chunk;
use serde::Serialize;
use std::cmp::Ordering;

/// Compute cosine similarity between two vectors.
///
/// Returns `None` when the similarity is undefined: different lengths, empty
/// vectors, a zero vector (the embedding fallback) or non-finite input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    let similarity = dot / (norm_a * norm_b);
    similarity.is_finite().then_some(similarity)
}

/// A chunk position paired with its similarity to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredChunk {
    /// Index into the chunk list.
    pub index: usize,
    /// Cosine similarity, `None` when undefined.
    pub score: Option<f32>,
}

impl ScoredChunk {
    /// Sort key; undefined similarities rank below every real score.
    fn rank_key(&self) -> f32 {
        self.score.unwrap_or(f32::NEG_INFINITY)
    }
}

/// Score every chunk vector against the query and sort best first.
///
/// The sort is stable: chunks with equal scores keep their document order.
pub fn rank(query: &[f32], embeddings: &[Vec<f32>]) -> Vec<ScoredChunk> {
    let mut scored: Vec<ScoredChunk> = embeddings
        .iter()
        .enumerate()
        .map(|(index, embedding)| ScoredChunk {
            index,
            score: cosine_similarity(query, embedding),
        })
        .collect();

    scored.sort_by(|a, b| {
        b.rank_key()
            .partial_cmp(&a.rank_key())
            .unwrap_or(Ordering::Equal)
    });

    scored
}

/// Return the text of the `k` chunks most similar to the query vector.
pub fn semantic_search(
    query: &[f32],
    chunks: &[Chunk],
    embeddings: &[Vec<f32>],
    k: usize,
) -> Vec<String> {
    rank(query, embeddings)
        .into_iter()
        .take(k)
        .filter_map(|hit| chunks.get(hit.index).map(|c| c.text.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::{ChunkConfig, chunk_text};

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(index, t)| Chunk {
                index,
                start: index * 10,
                text: t.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_self_similarity_is_one() {
        let a = vec![0.3, -1.2, 4.0, 0.01];
        assert!((cosine_similarity(&a, &a).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![-0.5, 4.0, 0.25];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_orthogonal_and_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).unwrap().abs() < 1e-6);
        assert!((cosine_similarity(&a, &[-2.0, 0.0, 0.0]).unwrap() + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector_is_undefined() {
        let a = vec![1.0, 2.0];
        assert_eq!(cosine_similarity(&a, &[0.0, 0.0]), None);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &a), None);
        assert_eq!(cosine_similarity(&a, &[1.0]), None);
    }

    #[test]
    fn test_zero_vectors_rank_last() {
        let query = vec![1.0, 0.0];
        let embeddings = vec![vec![0.0, 0.0], vec![-1.0, 0.0], vec![1.0, 1.0]];
        let ranked = rank(&query, &embeddings);

        let order: Vec<usize> = ranked.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![2, 1, 0]);
        assert_eq!(ranked[2].score, None);
    }

    #[test]
    fn test_ties_keep_document_order() {
        let query = vec![1.0, 0.0];
        let embeddings = vec![
            vec![0.0, 1.0],
            vec![2.0, 0.0],
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 3.0],
        ];
        let order: Vec<usize> = rank(&query, &embeddings).iter().map(|s| s.index).collect();
        assert_eq!(order, vec![1, 3, 0, 4, 2]);
    }

    #[test]
    fn test_closest_chunk_is_returned_for_k_one() {
        let chunks = chunks(&["about elevators", "about games", "about verification"]);
        let embeddings = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.1, 0.1, 1.0]];
        let query = vec![0.0, 0.2, 0.9];

        let result = semantic_search(&query, &chunks, &embeddings, 1);
        assert_eq!(result, vec![chunks[2].text.clone()]);
    }

    #[test]
    fn test_large_k_returns_every_chunk_sorted() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = chunk_text(text, &ChunkConfig::new(6, 2)).unwrap();
        let embeddings: Vec<Vec<f32>> = (0..chunks.len())
            .map(|i| vec![1.0, i as f32 * 0.5])
            .collect();
        let query = vec![1.0, 0.0];

        let ranked = rank(&query, &embeddings);
        let result = semantic_search(&query, &chunks, &embeddings, chunks.len() + 3);

        assert_eq!(result.len(), chunks.len());
        for pair in ranked.windows(2) {
            assert!(pair[0].score.unwrap() >= pair[1].score.unwrap());
        }
        assert_eq!(result[0], chunks[0].text);
    }
}
