//! Stockwise Runtime — the `generate_insight` service every front-end calls.

pub mod service;
pub mod types;

pub use service::{InsightService, InsightSettings};
pub use types::*;
