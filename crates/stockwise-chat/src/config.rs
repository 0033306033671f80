//! LLM configuration loading and provider selection.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{LLMProvider, LLMStatus, ResolvedProvider};

// llama3-8b-8192 was retired by Groq; 3.1-8b-instant is its replacement.
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-20241022";

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: usize = 800;

/// Stored LLM configuration (`llm-config.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// `auto`, `groq`, `openai` or `anthropic`.
    #[serde(default = "default_preferred")]
    pub preferred_provider: String,
    #[serde(default)]
    pub groq_api_key: Option<String>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_preferred() -> String {
    "auto".into()
}
fn default_groq_model() -> String {
    DEFAULT_GROQ_MODEL.into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.into()
}
fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}
fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            preferred_provider: default_preferred(),
            groq_api_key: None,
            openai_api_key: None,
            anthropic_api_key: None,
            groq_model: default_groq_model(),
            openai_model: default_openai_model(),
            anthropic_model: default_anthropic_model(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            config_path: PathBuf::new(),
        }
    }
}

impl LLMConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Like `load`, with an explicit variable lookup for API keys.
    pub fn load_with<F>(config_path: &Path, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: LLMConfig = match std::fs::read_to_string(config_path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring malformed {}: {}", config_path.display(), e);
                LLMConfig::default()
            }),
            Err(_) => {
                debug!("No LLM config at {}, using defaults", config_path.display());
                LLMConfig::default()
            }
        };

        config.config_path = config_path.to_path_buf();

        // Env vars as fallback for API keys
        if config.groq_api_key.is_none() {
            config.groq_api_key = lookup("GROQ_API_KEY");
        }
        if config.openai_api_key.is_none() {
            config.openai_api_key = lookup("OPENAI_API_KEY");
        }
        if config.anthropic_api_key.is_none() {
            config.anthropic_api_key = lookup("ANTHROPIC_API_KEY");
        }

        // Blank keys count as absent
        for key in [
            &mut config.groq_api_key,
            &mut config.openai_api_key,
            &mut config.anthropic_api_key,
        ] {
            if key.as_deref().is_some_and(|k| k.trim().is_empty()) {
                *key = None;
            }
        }

        config
    }

    fn candidate(&self, provider: LLMProvider) -> Option<ResolvedProvider> {
        let (key, model) = match provider {
            LLMProvider::Groq => (&self.groq_api_key, &self.groq_model),
            LLMProvider::OpenAI => (&self.openai_api_key, &self.openai_model),
            LLMProvider::Anthropic => (&self.anthropic_api_key, &self.anthropic_model),
        };
        key.as_ref().map(|k| ResolvedProvider {
            provider,
            model: model.clone(),
            api_key: k.clone(),
        })
    }

    /// Resolve which provider and model to use.
    pub fn resolve_provider(&self) -> Option<ResolvedProvider> {
        match self.preferred_provider.as_str() {
            "groq" => self.candidate(LLMProvider::Groq),
            "openai" => self.candidate(LLMProvider::OpenAI),
            "anthropic" => self.candidate(LLMProvider::Anthropic),
            // Auto mode: Groq > OpenAI > Anthropic
            "auto" => self
                .candidate(LLMProvider::Groq)
                .or_else(|| self.candidate(LLMProvider::OpenAI))
                .or_else(|| self.candidate(LLMProvider::Anthropic)),
            _ => None,
        }
    }

    /// Build the public status (no API keys exposed).
    pub fn status(&self) -> LLMStatus {
        let resolved = self.resolve_provider();
        LLMStatus {
            llm_available: resolved.is_some(),
            llm_provider: resolved.as_ref().map(|r| r.provider.to_string()),
            model: resolved.map(|r| r.model),
            groq_configured: self.groq_api_key.is_some(),
            openai_configured: self.openai_api_key.is_some(),
            anthropic_configured: self.anthropic_api_key.is_some(),
        }
    }
}
