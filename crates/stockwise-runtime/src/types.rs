//! Service-boundary types.

use serde::{Deserialize, Serialize};

/// Request accepted by every front-end.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Successful `generate_insight` result.
#[derive(Debug, Clone, Serialize)]
pub struct Insight {
    pub insight: String,
}

/// Failure body returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct InsightError {
    pub error: String,
}

/// Service status for health and dashboard probes.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub products: usize,
    pub embedder: String,
    pub embedding_dimension: usize,
    pub default_top_k: usize,
    pub llm: stockwise_chat::LLMStatus,
}
