//! Chat and summarization types.

use serde::{Deserialize, Serialize};

/// LLM provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    Groq,
    OpenAI,
    Anthropic,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::Groq => write!(f, "groq"),
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Chat message sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Input to the summarization collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub query: String,
    /// Formatted catalog context for the query.
    pub context: String,
}

/// Provider resolved from configuration for one call.
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub provider: LLMProvider,
    pub model: String,
    pub api_key: String,
}

/// LLM status (keys never exposed).
#[derive(Debug, Clone, Serialize)]
pub struct LLMStatus {
    #[serde(rename = "llmAvailable")]
    pub llm_available: bool,
    #[serde(rename = "llmProvider")]
    pub llm_provider: Option<String>,
    pub model: Option<String>,
    #[serde(rename = "groqConfigured")]
    pub groq_configured: bool,
    #[serde(rename = "openaiConfigured")]
    pub openai_configured: bool,
    #[serde(rename = "anthropicConfigured")]
    pub anthropic_configured: bool,
}
