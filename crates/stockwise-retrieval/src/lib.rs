//! Stockwise Retrieval — build-once embedding index and top-k ranking.
//!
//! `EmbeddingIndex` embeds every catalog record at startup. `Retriever`
//! embeds a query with the same backend and ranks records by cosine
//! similarity. `format_context` renders the ranking for the summarizer.

pub mod context;
pub mod index;
pub mod retriever;

pub use context::format_context;
pub use index::EmbeddingIndex;
pub use retriever::{RankedResult, Retriever};
