//! Summarization collaborator seam.

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use tracing::{debug, info};

use crate::config::LLMConfig;
use crate::prompt::build_messages;
use crate::providers::{collect_completion, stream_llm, CompletionParams};
use crate::types::{LLMStatus, SummaryRequest};
use stockwise_core::{Error, Result};

/// Turns a query plus catalog context into an insight.
pub trait Summarizer: Send + Sync {
    fn summarize<'a>(&'a self, request: &'a SummaryRequest) -> BoxFuture<'a, Result<String>>;

    /// Provider and model info for status endpoints.
    fn status(&self) -> LLMStatus;
}

/// Summarizer backed by a hosted chat-completion API.
pub struct LlmSummarizer {
    client: Client,
    config: LLMConfig,
}

impl LlmSummarizer {
    /// `request_timeout` bounds each HTTP exchange, streaming included.
    pub fn new(config: LLMConfig, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        match config.resolve_provider() {
            Some(r) => info!("Summarizer using {} ({})", r.provider, r.model),
            None => info!("No LLM provider configured; insights will fail until a key is set"),
        }

        Ok(Self { client, config })
    }

    async fn run(&self, request: &SummaryRequest) -> Result<String> {
        let resolved = self
            .config
            .resolve_provider()
            .ok_or_else(|| Error::Summarization("No LLM provider configured".into()))?;

        let params = CompletionParams {
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        let stream = stream_llm(&self.client, &resolved, build_messages(request), params);
        let (text, tokens_used) = collect_completion(stream).await?;

        debug!("Insight generated: {} chunks from {}", tokens_used, resolved.model);
        Ok(text)
    }
}

impl Summarizer for LlmSummarizer {
    fn summarize<'a>(&'a self, request: &'a SummaryRequest) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.run(request))
    }

    fn status(&self) -> LLMStatus {
        self.config.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_provider_is_summarization_error() {
        let summarizer = LlmSummarizer::new(LLMConfig::default(), Duration::from_secs(5)).unwrap();
        let request = SummaryRequest {
            query: "stock lait".into(),
            context: String::new(),
        };
        match summarizer.summarize(&request).await {
            Err(Error::Summarization(msg)) => assert!(msg.contains("No LLM provider")),
            other => panic!("expected Summarization error, got {:?}", other),
        }
        assert!(!summarizer.status().llm_available);
    }
}
