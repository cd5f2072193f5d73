//! Prezzario Core Library
//!
//! Retrieval core for matching free-text construction site descriptions
//! against Italian regional price catalogs.
//!
//! # Features
//! - In-memory BM25 lexical scoring over catalog chunks
//! - Semantic similarity via embeddings, brute force or HNSW
//! - Score fusion with softmax sharpening and a tunable lexical weight
//! - LLM-driven query refinement, relevance judging and a bounded
//!   retry loop orchestrating the whole pipeline

pub mod config;
pub mod corpus;
pub mod error;
pub mod llm;
pub mod search;

pub use config::{Config, CorpusConfig, LLMServiceConfig, RetrievalConfig};
pub use corpus::{
    activity::{parse_activities, Activity, Resource},
    Chunk, CorpusIndex, CorpusStats,
};
pub use error::{Error, PrezzarioError, Result};
pub use llm::{
    ChatMessage, Embedder, HttpEmbedder, HttpQueryRefiner, HttpRelevanceJudge, LLMClient,
    OpenAiClient, QueryRefiner, RelevanceJudge,
};
pub use search::{
    hybrid_retrieve, AnnIndex, BestMatch, Bm25Index, JudgedCandidate, RetrievalOutcome, Retriever,
    ScoredCandidate, SearchOptions,
};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "prezzario";
