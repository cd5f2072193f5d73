//! Retrieval engine module
//!
//! Provides:
//! - In-memory BM25 lexical scoring
//! - Semantic scoring (brute-force cosine or HNSW nearest neighbors)
//! - Score fusion with softmax sharpening
//! - The refine/retrieve/judge orchestrator

mod bm25;
mod fusion;
mod hybrid;
mod orchestrator;
mod semantic;

pub use bm25::Bm25Index;
pub use fusion::{fuse_scores, min_max_normalize, rank_top_k, softmax};
pub use hybrid::hybrid_retrieve;
pub use orchestrator::{BestMatch, RetrievalOutcome, Retriever};
pub use semantic::{cosine_similarity, semantic_scores, AnnIndex};

/// Per-query retrieval options
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Candidates returned per query
    pub top_k: usize,
    /// BM25 weight in fusion; `1 - alpha` goes to the semantic signal
    pub alpha: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            alpha: 0.1,
        }
    }
}

/// Transient per-call candidate with its retrieval scores
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    /// Corpus position of the chunk
    pub chunk_id: usize,
    /// Raw BM25 score (unbounded, >= 0)
    pub lexical_score: f64,
    /// Cosine similarity of query and chunk embeddings
    pub semantic_score: f64,
    /// Fused score the ranking was produced under
    pub combined_score: f64,
}

/// Candidate after relevance judging, in first-seen order
#[derive(Debug, Clone)]
pub struct JudgedCandidate {
    pub chunk_id: usize,
    /// Judge score, 0-100
    pub relevance: u8,
}
