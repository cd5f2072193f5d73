//! Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Corpus file locations
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Retrieval tuning knobs
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// LLM service configuration
    #[serde(default)]
    pub llm_service: LLMServiceConfig,
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the LLM service for chat/completions
    pub url: String,

    /// Model name for chat completions (query refinement, relevance judging)
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimensions (will be auto-detected if not specified)
    #[serde(default)]
    pub embedding_dimensions: Option<usize>,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl LLMServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("PREZZARIO_LLM_URL")
                .unwrap_or_else(|_| "https://api.mistral.ai".to_string()),
            model: default_chat_model(),
            embedding_url: std::env::var("PREZZARIO_EMBEDDING_URL").ok(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: std::env::var("PREZZARIO_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok()),
            api_key: std::env::var("PREZZARIO_LLM_API_KEY").ok(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_chat_model() -> String {
    std::env::var("PREZZARIO_LLM_MODEL").unwrap_or_else(|_| "mistral-small-latest".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("PREZZARIO_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2".to_string())
}

fn default_timeout() -> u64 {
    30
}

/// Corpus file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Flat chunk file, one catalog activity per line
    #[serde(default = "default_chunks_path")]
    pub chunks_path: PathBuf,

    /// Serialized embedding matrix, co-located with the chunk file
    #[serde(default = "default_embeddings_path")]
    pub embeddings_path: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            chunks_path: default_chunks_path(),
            embeddings_path: default_embeddings_path(),
        }
    }
}

fn default_chunks_path() -> PathBuf {
    PathBuf::from("all_chunks.txt")
}

fn default_embeddings_path() -> PathBuf {
    PathBuf::from("chunk_embeddings.json")
}

/// Retrieval tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Candidates retrieved per refined query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// BM25 weight in score fusion; the remainder goes to the semantic
    /// signal. Queries are short category phrases, so the default leans
    /// heavily semantic.
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Judge score (0-100) at which the orchestrator stops searching
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: u8,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            alpha: default_alpha(),
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

fn default_alpha() -> f64 {
    0.1
}

fn default_confidence_threshold() -> u8 {
    90
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from an explicit path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_defaults() {
        let cfg = RetrievalConfig::default();
        assert_eq!(cfg.top_k, 5);
        assert!((cfg.alpha - 0.1).abs() < f64::EPSILON);
        assert_eq!(cfg.confidence_threshold, 90);
    }

    #[test]
    fn test_config_roundtrip() {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.retrieval.top_k, cfg.retrieval.top_k);
        assert_eq!(back.corpus.chunks_path, cfg.corpus.chunks_path);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let cfg = Config::load_from(std::path::Path::new("/nonexistent/config.yml")).unwrap();
        assert_eq!(cfg.retrieval.confidence_threshold, 90);
    }
}
