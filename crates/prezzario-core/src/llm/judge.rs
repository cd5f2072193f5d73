//! LLM-backed relevance judging
//!
//! Asks the oracle how relevant a candidate activity title is to the
//! original query, on a 0-100 scale. The reply is free text; the score is
//! the first run of digits found in it. Every failure mode scores 0 so a
//! broken oracle can never promote a candidate.

use super::{ChatMessage, LLMClient, RelevanceJudge};
use crate::config::LLMServiceConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Relevance judge using an external HTTP LLM service
pub struct HttpRelevanceJudge {
    client: Arc<dyn LLMClient>,
}

impl HttpRelevanceJudge {
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
}

#[async_trait]
impl RelevanceJudge for HttpRelevanceJudge {
    async fn judge(&self, original_query: &str, candidate_title: &str) -> u8 {
        let prompt = format!(
            "Is the following construction activity relevant to the query \
             '{}'? Activity: '{}'. Return number from 1 to 100 representing accuracy.",
            original_query, candidate_title
        );

        let messages = vec![
            ChatMessage::system(
                "You judge whether a price-catalog activity matches a query. \
                 Answer with a single accuracy number from 1 to 100, nothing else.",
            ),
            ChatMessage::user(prompt),
        ];

        match self.client.chat_completion(messages).await {
            Ok(response) => parse_accuracy(&response),
            Err(e) => {
                tracing::warn!("Judge call failed: {}, scoring 0", e);
                0
            }
        }
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}

/// Extract the first run of digits from a free-text reply, clamped to 100.
/// No digits means score 0.
pub fn parse_accuracy(response: &str) -> u8 {
    let digits: String = response
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    match digits.parse::<u32>() {
        Ok(n) => n.min(100) as u8,
        Err(_) => 0,
    }
}
