//! LLM trait definitions

use crate::error::Result;
use async_trait::async_trait;

/// Embedding generation trait
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for batch of texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Query refinement trait.
///
/// Both methods degrade instead of failing: the retrieval pipeline must
/// keep working when the oracle is down or rate-limited, so transport and
/// in-band failures surface as the documented fallback values, never as
/// errors.
#[async_trait]
pub trait QueryRefiner: Send + Sync {
    /// Rewrite a raw query into one or more canonical catalog category
    /// phrases. Falls back to `vec![raw_query]` when the oracle fails.
    async fn refine(&self, raw_query: &str) -> Vec<String>;

    /// Produce alternative phrasings for a retry round. Falls back to an
    /// empty list when the oracle fails, so the caller skips the retry
    /// instead of looping on the original query.
    async fn alternatives(&self, raw_query: &str) -> Vec<String>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Candidate relevance judging trait
#[async_trait]
pub trait RelevanceJudge: Send + Sync {
    /// Score how relevant `candidate_title` is to `original_query`,
    /// 0 to 100. Any failure scores 0; a failed judgment must never be
    /// mistaken for a confident one.
    async fn judge(&self, original_query: &str, candidate_title: &str) -> u8;

    /// Get model name
    fn model_name(&self) -> &str;
}
