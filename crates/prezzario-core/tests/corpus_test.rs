//! Integration tests for corpus loading and the embedding cache lifecycle

use async_trait::async_trait;
use prezzario_core::{CorpusIndex, Embedder, PrezzarioError, Result};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Counts how many times the corpus had to be re-encoded
struct CountingEmbedder {
    model: String,
    batches: AtomicUsize,
}

impl CountingEmbedder {
    fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            batches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Embedder for CountingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(vec![text.len() as f32, 1.0])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        let mut out = Vec::with_capacity(texts.len());
        for t in texts {
            out.push(self.embed(t).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[tokio::test]
async fn test_load_builds_cache_then_reuses_it() {
    let temp = TempDir::new().unwrap();
    let chunks_path = temp.path().join("all_chunks.txt");
    let cache_path = temp.path().join("chunk_embeddings.json");
    fs::write(&chunks_path, "demolizione muri\nposa pavimenti\n").unwrap();

    let embedder = CountingEmbedder::new("model-a");

    let corpus = CorpusIndex::load(&chunks_path, &cache_path, &embedder)
        .await
        .unwrap();
    assert_eq!(corpus.len(), 2);
    assert_eq!(corpus.embeddings().len(), 2);
    assert_eq!(embedder.batches.load(Ordering::SeqCst), 1);
    assert!(cache_path.exists());

    // Second load finds a valid cache and does not re-encode
    let corpus = CorpusIndex::load(&chunks_path, &cache_path, &embedder)
        .await
        .unwrap();
    assert_eq!(corpus.len(), 2);
    assert_eq!(embedder.batches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stale_cache_row_count_regenerates() {
    let temp = TempDir::new().unwrap();
    let chunks_path = temp.path().join("all_chunks.txt");
    let cache_path = temp.path().join("chunk_embeddings.json");
    fs::write(&chunks_path, "demolizione muri\nposa pavimenti\n").unwrap();

    let embedder = CountingEmbedder::new("model-a");
    CorpusIndex::load(&chunks_path, &cache_path, &embedder)
        .await
        .unwrap();

    // The corpus grows; the persisted matrix no longer matches
    fs::write(
        &chunks_path,
        "demolizione muri\nposa pavimenti\ntinteggiatura pareti\n",
    )
    .unwrap();

    let corpus = CorpusIndex::load(&chunks_path, &cache_path, &embedder)
        .await
        .unwrap();
    assert_eq!(corpus.len(), 3);
    assert_eq!(corpus.embeddings().len(), 3);
    assert_eq!(embedder.batches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cache_from_other_model_regenerates() {
    let temp = TempDir::new().unwrap();
    let chunks_path = temp.path().join("all_chunks.txt");
    let cache_path = temp.path().join("chunk_embeddings.json");
    fs::write(&chunks_path, "demolizione muri\n").unwrap();

    let embedder_a = CountingEmbedder::new("model-a");
    CorpusIndex::load(&chunks_path, &cache_path, &embedder_a)
        .await
        .unwrap();

    // Same row count, different model: scores would be meaningless
    let embedder_b = CountingEmbedder::new("model-b");
    let corpus = CorpusIndex::load(&chunks_path, &cache_path, &embedder_b)
        .await
        .unwrap();
    assert_eq!(corpus.embedding_model(), "model-b");
    assert_eq!(embedder_b.batches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_chunk_file_is_fatal() {
    let temp = TempDir::new().unwrap();
    let embedder = CountingEmbedder::new("model-a");

    let err = CorpusIndex::load(
        &temp.path().join("missing.txt"),
        &temp.path().join("cache.json"),
        &embedder,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PrezzarioError::CorpusLoad(_)));
}

#[tokio::test]
async fn test_empty_chunk_file_is_fatal() {
    let temp = TempDir::new().unwrap();
    let chunks_path = temp.path().join("all_chunks.txt");
    fs::write(&chunks_path, "\n\n  \n").unwrap();

    let embedder = CountingEmbedder::new("model-a");
    let err = CorpusIndex::load(&chunks_path, &temp.path().join("cache.json"), &embedder)
        .await
        .unwrap_err();
    assert!(matches!(err, PrezzarioError::CorpusLoad(_)));
}

#[tokio::test]
async fn test_corrupt_cache_regenerates() {
    let temp = TempDir::new().unwrap();
    let chunks_path = temp.path().join("all_chunks.txt");
    let cache_path = temp.path().join("chunk_embeddings.json");
    fs::write(&chunks_path, "demolizione muri\n").unwrap();
    fs::write(&cache_path, "not json at all").unwrap();

    let embedder = CountingEmbedder::new("model-a");
    let corpus = CorpusIndex::load(&chunks_path, &cache_path, &embedder)
        .await
        .unwrap();
    assert_eq!(corpus.len(), 1);
    assert_eq!(embedder.batches.load(Ordering::SeqCst), 1);
}
