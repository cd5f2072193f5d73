//! LLM integration
//!
//! Provides traits and implementations for:
//! - Query and corpus embedding via external services (Mistral, vLLM, OpenAI, etc.)
//! - Query refinement into canonical catalog category phrases
//! - Candidate relevance judging on a 0-100 scale

mod cache;
mod client;
mod embedder;
mod judge;
mod refiner;
mod traits;

pub use client::{ChatMessage, LLMClient, OpenAiClient};
pub use embedder::HttpEmbedder;
pub use judge::HttpRelevanceJudge;
pub use refiner::HttpQueryRefiner;
pub use traits::*;
