//! External LLM provider streaming.
//!
//! Every provider streams tokens over SSE. OpenAI and Groq share one
//! payload format; Anthropic uses its own event types.

use std::pin::Pin;

use futures::Stream;
use reqwest::{Client, RequestBuilder};
use serde_json::json;
use tokio_stream::StreamExt;
use tracing::{debug, error};

use crate::types::{ChatMessage, LLMProvider, ResolvedProvider};
use stockwise_core::{Error, Result};

const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Boxed stream type for returning different stream implementations.
pub type BoxedStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

/// A single streamed token or error.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    Token(String),
    Done { tokens_used: usize },
    Error(String),
}

/// Sampling parameters for one completion.
#[derive(Debug, Clone, Copy)]
pub struct CompletionParams {
    pub temperature: f64,
    pub max_tokens: usize,
}

/// Interpretation of one SSE `data:` payload.
#[derive(Debug, PartialEq)]
enum SseData {
    Token(String),
    Done,
    Error(String),
    Skip,
}

/// Stream tokens from the resolved provider.
pub fn stream_llm(
    client: &Client,
    resolved: &ResolvedProvider,
    messages: Vec<ChatMessage>,
    params: CompletionParams,
) -> BoxedStream {
    debug!(
        "Streaming from {} with model {}",
        resolved.provider, resolved.model
    );

    match resolved.provider {
        LLMProvider::Groq | LLMProvider::OpenAI => {
            let url = if resolved.provider == LLMProvider::Groq {
                GROQ_URL
            } else {
                OPENAI_URL
            };
            let body = json!({
                "model": resolved.model,
                "messages": messages,
                "temperature": params.temperature,
                "max_tokens": params.max_tokens,
                "stream": true,
            });
            let request = client
                .post(url)
                .header("Authorization", format!("Bearer {}", resolved.api_key))
                .json(&body);
            Box::pin(stream_sse(request, parse_openai_data))
        }
        LLMProvider::Anthropic => {
            // Anthropic takes the system prompt outside the message list
            let system: Option<String> = messages
                .iter()
                .find(|m| m.role == "system")
                .map(|m| m.content.clone());
            let conversation: Vec<&ChatMessage> =
                messages.iter().filter(|m| m.role != "system").collect();

            let mut body = json!({
                "model": resolved.model,
                "messages": conversation,
                "temperature": params.temperature,
                "max_tokens": params.max_tokens,
                "stream": true,
            });
            if let Some(sys) = system {
                body["system"] = json!(sys);
            }
            let request = client
                .post(ANTHROPIC_URL)
                .header("x-api-key", &resolved.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body);
            Box::pin(stream_sse(request, parse_anthropic_data))
        }
    }
}

/// Drain a streamed completion into one string.
///
/// Provider errors and empty answers are both `Error::Summarization`.
pub async fn collect_completion(mut stream: BoxedStream) -> Result<(String, usize)> {
    let mut text = String::new();
    let mut tokens_used = 0;

    while let Some(chunk) = stream.next().await {
        match chunk {
            StreamChunk::Token(t) => text.push_str(&t),
            StreamChunk::Done { tokens_used: t } => {
                tokens_used = t;
                break;
            }
            StreamChunk::Error(e) => return Err(Error::Summarization(e)),
        }
    }

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(Error::Summarization("model returned an empty completion".into()));
    }
    Ok((text, tokens_used))
}

fn stream_sse(
    request: RequestBuilder,
    parse: fn(&str) -> SseData,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    async_stream::stream! {
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                yield StreamChunk::Error(format!("Request failed: {}", e));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            yield StreamChunk::Error(format!("API error {}: {}", status, body));
            return;
        }

        let mut bytes = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut token_count = 0usize;

        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(b) => buffer.extend_from_slice(&b),
                Err(e) => {
                    yield StreamChunk::Error(format!("Stream read error: {}", e));
                    return;
                }
            }

            for line in drain_lines(&mut buffer) {
                let data = match line.strip_prefix("data:") {
                    Some(d) => d.trim(),
                    None => continue,
                };
                match parse(data) {
                    SseData::Token(t) => {
                        token_count += 1;
                        yield StreamChunk::Token(t);
                    }
                    SseData::Done => {
                        yield StreamChunk::Done { tokens_used: token_count };
                        return;
                    }
                    SseData::Error(e) => {
                        error!("Provider stream error: {}", e);
                        yield StreamChunk::Error(e);
                        return;
                    }
                    SseData::Skip => {}
                }
            }
        }

        yield StreamChunk::Done { tokens_used: token_count };
    }
}

/// Remove complete lines from `buffer`, skipping blanks and SSE comments.
///
/// Bytes after the last newline stay buffered undecoded, so a character
/// split across network chunks is decoded once both halves have arrived.
fn drain_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(end) = buffer.iter().position(|&b| b == b'\n') {
        let raw: Vec<u8> = buffer.drain(..=end).collect();
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim();
        if !line.is_empty() && !line.starts_with(':') {
            lines.push(line.to_string());
        }
    }
    lines
}

fn parse_openai_data(data: &str) -> SseData {
    if data == "[DONE]" {
        return SseData::Done;
    }
    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(data) else {
        return SseData::Skip;
    };
    if let Some(msg) = parsed["error"]["message"].as_str() {
        return SseData::Error(msg.to_string());
    }
    match parsed["choices"][0]["delta"]["content"].as_str() {
        Some(content) if !content.is_empty() => SseData::Token(content.to_string()),
        _ => SseData::Skip,
    }
}

fn parse_anthropic_data(data: &str) -> SseData {
    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(data) else {
        return SseData::Skip;
    };
    match parsed["type"].as_str() {
        Some("content_block_delta") => match parsed["delta"]["text"].as_str() {
            Some(text) if !text.is_empty() => SseData::Token(text.to_string()),
            _ => SseData::Skip,
        },
        Some("message_stop") => SseData::Done,
        Some("error") => SseData::Error(
            parsed["error"]["message"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        ),
        _ => SseData::Skip,
    }
}
