//! Semantic scoring
//!
//! Cosine similarity between a query embedding and the corpus embedding
//! matrix. Small corpora are scored brute force; above a size threshold an
//! HNSW index answers top-k nearest neighbors and every chunk it does not
//! return scores 0.

use instant_distance::{Builder, HnswMap, Search};

/// Minimum embedding count to justify building an ANN index.
/// Below this threshold, brute-force is fast enough.
const ANN_THRESHOLD: usize = 1000;

/// Cosine similarity of two vectors; 0 on dimension mismatch or zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Wrapper for f32 vectors implementing instant_distance::Point
#[derive(Clone)]
struct EmbeddingPoint {
    values: Vec<f32>,
}

impl instant_distance::Point for EmbeddingPoint {
    fn distance(&self, other: &Self) -> f32 {
        // Cosine distance = 1.0 - cosine_similarity
        1.0 - cosine_similarity(&self.values, &other.values)
    }
}

/// HNSW-backed approximate nearest neighbor index over corpus embeddings
pub struct AnnIndex {
    index: Option<HnswMap<EmbeddingPoint, usize>>,
    embedding_count: usize,
}

impl AnnIndex {
    /// Build from the corpus embedding matrix. Skips building below
    /// `ANN_THRESHOLD` rows; `search` then returns empty and callers fall
    /// back to brute force.
    pub fn build(embeddings: &[Vec<f32>]) -> Self {
        let count = embeddings.len();

        if count < ANN_THRESHOLD {
            tracing::debug!(
                "Skipping ANN index build: {} embeddings < {} threshold",
                count,
                ANN_THRESHOLD
            );
            return Self {
                index: None,
                embedding_count: count,
            };
        }

        let (points, ids): (Vec<EmbeddingPoint>, Vec<usize>) = embeddings
            .iter()
            .enumerate()
            .map(|(id, values)| {
                (
                    EmbeddingPoint {
                        values: values.clone(),
                    },
                    id,
                )
            })
            .unzip();

        let hnsw_map = Builder::default().build(points, ids);
        tracing::info!("Built ANN index with {} embeddings", count);

        Self {
            index: Some(hnsw_map),
            embedding_count: count,
        }
    }

    /// Search for the k nearest neighbors of `query`.
    /// Returns (chunk_id, cosine_similarity) pairs, empty if not built.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let Some(map) = self.index.as_ref() else {
            return vec![];
        };

        let query_point = EmbeddingPoint {
            values: query.to_vec(),
        };
        let mut search = Search::default();

        map.search(&query_point, &mut search)
            .take(k)
            .map(|item| (*item.value, 1.0 - item.distance))
            .collect()
    }

    /// Whether the HNSW index has been built
    pub fn is_built(&self) -> bool {
        self.index.is_some()
    }

    /// Number of embeddings loaded (even if index wasn't built)
    pub fn len(&self) -> usize {
        self.embedding_count
    }

    pub fn is_empty(&self) -> bool {
        self.embedding_count == 0
    }
}

/// Semantic score per chunk for one query embedding.
///
/// Uses the ANN index when built (chunks outside the top-k implicitly
/// score 0), otherwise scores the whole matrix brute force. `top_k` bounds
/// the ANN request to what the caller actually needs downstream.
pub fn semantic_scores(
    query_embedding: &[f32],
    embeddings: &[Vec<f32>],
    ann: Option<&AnnIndex>,
    top_k: usize,
) -> Vec<f64> {
    if let Some(ann) = ann.filter(|a| a.is_built()) {
        let mut scores = vec![0.0; embeddings.len()];
        for (chunk_id, similarity) in ann.search(query_embedding, top_k) {
            if let Some(slot) = scores.get_mut(chunk_id) {
                *slot = f64::from(similarity);
            }
        }
        return scores;
    }

    embeddings
        .iter()
        .map(|e| f64::from(cosine_similarity(query_embedding, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identity() {
        let v = vec![0.6, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_mismatched_or_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_ann_below_threshold_not_built() {
        let embeddings = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let ann = AnnIndex::build(&embeddings);
        assert!(!ann.is_built());
        assert_eq!(ann.len(), 2);
        assert!(ann.search(&[1.0, 0.0], 5).is_empty());
    }

    #[test]
    fn test_ann_build_and_search() {
        let embeddings: Vec<Vec<f32>> = (0..ANN_THRESHOLD + 10)
            .map(|i| {
                let angle = i as f32 * 0.01;
                vec![angle.sin(), angle.cos()]
            })
            .collect();
        let ann = AnnIndex::build(&embeddings);
        assert!(ann.is_built());

        let results = ann.search(&embeddings[42], 5);
        assert_eq!(results.len(), 5);
        for (id, sim) in &results {
            assert!(*id < embeddings.len());
            assert!(*sim >= -1.0 && *sim <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn test_brute_force_scores_whole_corpus() {
        let embeddings = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]];
        let scores = semantic_scores(&[1.0, 0.0], &embeddings, None, 2);
        assert_eq!(scores.len(), 3);
        assert!(scores[0] > scores[2]);
        assert!(scores[2] > scores[1]);
    }

    #[test]
    fn test_unbuilt_ann_falls_back_to_brute_force() {
        let embeddings = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let ann = AnnIndex::build(&embeddings);
        let scores = semantic_scores(&[1.0, 0.0], &embeddings, Some(&ann), 1);
        // Brute force path: both chunks scored
        assert!(scores[0] > 0.9);
        assert_eq!(scores.len(), 2);
    }
}
