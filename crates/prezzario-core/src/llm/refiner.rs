//! LLM-backed query refinement
//!
//! Rewrites a raw site description into canonical Italian catalog category
//! phrases, and produces alternative phrasings for the retry round. Both
//! calls degrade gracefully: the retrieval pipeline must keep working on
//! the original text when the oracle is unavailable.

use super::{ChatMessage, LLMClient, QueryRefiner};
use crate::config::LLMServiceConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Query refiner using an external HTTP LLM service
pub struct HttpQueryRefiner {
    client: Arc<dyn LLMClient>,
}

impl HttpQueryRefiner {
    /// Create from LLM client
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }

    /// Create from configuration
    pub fn from_config(config: LLMServiceConfig) -> Result<Self> {
        let client = super::OpenAiClient::new(config)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let client = super::OpenAiClient::from_env()?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    async fn ask(&self, system: &str, user: String) -> Option<String> {
        let messages = vec![ChatMessage::system(system), ChatMessage::user(user)];

        match self.client.chat_completion(messages).await {
            Ok(response) if looks_like_failure(&response) => {
                tracing::warn!("Oracle reply looks like a failure marker, degrading");
                None
            }
            Ok(response) => Some(response),
            Err(e) => {
                tracing::warn!("Oracle call failed: {}, degrading", e);
                None
            }
        }
    }
}

#[async_trait]
impl QueryRefiner for HttpQueryRefiner {
    async fn refine(&self, raw_query: &str) -> Vec<String> {
        let user = format!(
            "Define the construction activity category in italian that \
             describes it best in Prezziario with one to max 10 words, \
             exclude any other commentary, for: {}",
            raw_query
        );

        match self.ask(REFINE_SYSTEM_PROMPT, user).await {
            Some(response) => {
                let phrases = split_phrases(&response);
                if phrases.is_empty() {
                    vec![raw_query.to_string()]
                } else {
                    tracing::debug!("Refined query into {} phrases", phrases.len());
                    phrases
                }
            }
            None => vec![raw_query.to_string()],
        }
    }

    async fn alternatives(&self, raw_query: &str) -> Vec<String> {
        let user = format!(
            "Give 5 alternative ways to describe the same construction \
             activity as: {}, in italian, each as a single line, no commentary.",
            raw_query
        );

        // Degrades to empty so the caller skips the retry round
        match self.ask(REFINE_SYSTEM_PROMPT, user).await {
            Some(response) => split_phrases(&response),
            None => vec![],
        }
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}

const REFINE_SYSTEM_PROMPT: &str =
    "You are an assistant for matching construction site descriptions \
     against Italian regional price catalogs (prezziari). Answer with the \
     requested phrases only, no commentary.";

/// Split an oracle reply into candidate phrases on newlines, commas and
/// semicolons, dropping empties.
fn split_phrases(response: &str) -> Vec<String> {
    response
        .split(['\n', ',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Best-effort in-band failure detection. Typed transport errors are the
/// primary channel; some gateways still answer 200 with an error payload.
fn looks_like_failure(response: &str) -> bool {
    let lower = response.to_lowercase();
    lower.contains("error") || lower.contains("rate limit")
}
