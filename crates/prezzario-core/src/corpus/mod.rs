//! Corpus storage
//!
//! Holds the immutable catalog of chunks (one price-catalog activity per
//! chunk) together with their precomputed embedding matrix. The corpus is
//! built offline and read-only at query time; concurrent retrieval sessions
//! may share it behind an `Arc`.

pub mod activity;
pub mod ingest;

use crate::error::{PrezzarioError, Result};
use crate::llm::Embedder;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Maximum title length for a single-line chunk, in characters
const TITLE_MAX_CHARS: usize = 500;

/// One immutable unit of catalog text
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Stable position in the corpus
    pub id: usize,
    /// Raw catalog line
    pub text: String,
}

impl Chunk {
    /// Short title used in judge prompts: the first line of a multi-line
    /// chunk, otherwise the first 500 characters. The truncation rule is
    /// part of the judging contract and must stay stable across versions.
    pub fn title(&self) -> &str {
        if let Some(pos) = self.text.find('\n') {
            &self.text[..pos]
        } else {
            match self.text.char_indices().nth(TITLE_MAX_CHARS) {
                Some((byte_idx, _)) => &self.text[..byte_idx],
                None => &self.text,
            }
        }
    }
}

/// Persisted embedding matrix, keyed by the model that produced it
#[derive(Debug, Serialize, Deserialize)]
struct EmbeddingCache {
    model: String,
    dimensions: usize,
    embeddings: Vec<Vec<f32>>,
}

/// Corpus of chunks plus their embedding matrix.
///
/// Invariant: `chunks.len() == embeddings.len()`, and every row was produced
/// by `embedding_model`. Queries embedded under a different model make the
/// similarity scores meaningless, so the model name is recorded here and
/// checked when the cache is loaded.
#[derive(Debug)]
pub struct CorpusIndex {
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
    embedding_model: String,
}

impl CorpusIndex {
    /// Load chunks from a flat file (one chunk per non-blank line) and the
    /// co-located embedding cache. A stale cache (row-count or model
    /// mismatch) is regenerated through `embedder` and rewritten; a missing
    /// or empty chunk file is fatal.
    pub async fn load(
        chunks_path: &Path,
        embeddings_path: &Path,
        embedder: &dyn Embedder,
    ) -> Result<Self> {
        let chunks = load_chunks(chunks_path)?;

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = match load_cache(embeddings_path) {
            Some(cache)
                if cache.embeddings.len() == chunks.len()
                    && cache.model == embedder.model_name() =>
            {
                tracing::debug!(
                    "Embedding cache valid: {} rows, model {}",
                    cache.embeddings.len(),
                    cache.model
                );
                cache.embeddings
            }
            Some(cache) => {
                tracing::warn!(
                    "Embedding cache stale ({} rows / model {}, corpus has {} chunks / model {}), regenerating",
                    cache.embeddings.len(),
                    cache.model,
                    chunks.len(),
                    embedder.model_name()
                );
                regenerate(embeddings_path, &texts, embedder).await?
            }
            None => {
                tracing::info!("No embedding cache at {:?}, encoding corpus", embeddings_path);
                regenerate(embeddings_path, &texts, embedder).await?
            }
        };

        if embeddings.len() != chunks.len() {
            return Err(PrezzarioError::CorpusLoad(format!(
                "embedding count {} does not match chunk count {}",
                embeddings.len(),
                chunks.len()
            )));
        }

        Ok(Self {
            chunks,
            embeddings,
            embedding_model: embedder.model_name().to_string(),
        })
    }

    /// Build an index from in-memory data. The caller guarantees the rows
    /// come from `embedding_model`.
    pub fn from_parts(
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
        embedding_model: impl Into<String>,
    ) -> Result<Self> {
        if chunks.is_empty() {
            return Err(PrezzarioError::CorpusLoad("corpus is empty".to_string()));
        }
        if chunks.len() != embeddings.len() {
            return Err(PrezzarioError::CorpusLoad(format!(
                "embedding count {} does not match chunk count {}",
                embeddings.len(),
                chunks.len()
            )));
        }
        Ok(Self {
            chunks,
            embeddings,
            embedding_model: embedding_model.into(),
        })
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn get(&self, id: usize) -> Option<&Chunk> {
        self.chunks.get(id)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// On-disk corpus summary for status reporting
#[derive(Debug, Serialize)]
pub struct CorpusStats {
    pub chunk_count: usize,
    pub embedded_count: usize,
    pub embedding_model: Option<String>,
    pub embedding_dimensions: Option<usize>,
}

/// Inspect the on-disk corpus without loading it or touching the embedder.
pub fn stats(chunks_path: &Path, embeddings_path: &Path) -> CorpusStats {
    let chunk_count = std::fs::read_to_string(chunks_path)
        .map(|c| c.lines().filter(|l| !l.trim().is_empty()).count())
        .unwrap_or(0);
    let cache = load_cache(embeddings_path);

    CorpusStats {
        chunk_count,
        embedded_count: cache.as_ref().map(|c| c.embeddings.len()).unwrap_or(0),
        embedding_model: cache.as_ref().map(|c| c.model.clone()),
        embedding_dimensions: cache.map(|c| c.dimensions),
    }
}

fn load_chunks(path: &Path) -> Result<Vec<Chunk>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PrezzarioError::CorpusLoad(format!("cannot read chunk file {:?}: {}", path, e))
    })?;

    let chunks: Vec<Chunk> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(id, line)| Chunk {
            id,
            text: line.to_string(),
        })
        .collect();

    if chunks.is_empty() {
        return Err(PrezzarioError::CorpusLoad(format!(
            "chunk file {:?} contains no chunks",
            path
        )));
    }

    tracing::info!("Loaded {} chunks from {:?}", chunks.len(), path);
    Ok(chunks)
}

fn load_cache(path: &Path) -> Option<EmbeddingCache> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(cache) => Some(cache),
        Err(e) => {
            tracing::warn!("Unreadable embedding cache {:?}: {}", path, e);
            None
        }
    }
}

async fn regenerate(
    path: &Path,
    texts: &[String],
    embedder: &dyn Embedder,
) -> Result<Vec<Vec<f32>>> {
    let embeddings = embedder.embed_batch(texts).await?;

    let cache = EmbeddingCache {
        model: embedder.model_name().to_string(),
        dimensions: embeddings.first().map(|e| e.len()).unwrap_or(0),
        embeddings,
    };
    std::fs::write(path, serde_json::to_string(&cache)?)?;
    tracing::info!("Wrote embedding cache: {} rows to {:?}", cache.embeddings.len(), path);

    Ok(cache.embeddings)
}
