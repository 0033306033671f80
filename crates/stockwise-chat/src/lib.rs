//! Insight summarization with external LLM streaming (Groq/OpenAI/Anthropic).
//!
//! The retrieval core hands over the query and a formatted context block;
//! this crate turns them into a prompt and collects the model's answer.

pub mod config;
pub mod prompt;
pub mod providers;
pub mod summarizer;
pub mod types;

pub use config::LLMConfig;
pub use summarizer::{LlmSummarizer, Summarizer};
pub use types::*;
