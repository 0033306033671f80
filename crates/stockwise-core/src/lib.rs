//! Stockwise Core — error taxonomy and service configuration.

pub mod config;
pub mod error;

pub use config::{DataPaths, EmbedderKind, StockwiseConfig};
pub use error::{Error, Result};
