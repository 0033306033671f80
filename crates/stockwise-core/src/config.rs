//! Configuration and data directory management.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Paths to the Stockwise data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Product catalog (`data/knowledge_base.json`).
    pub catalog: PathBuf,
    /// Embedding model directory (`data/models/`).
    pub models: PathBuf,
    /// LLM configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
}

impl DataPaths {
    /// Derive data paths from a root directory. Nothing is created on disk.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            catalog: root.join("knowledge_base.json"),
            models: root.join("models"),
            llm_config_file: root.join("llm-config.json"),
            root,
        }
    }
}

/// Which embedding backend to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    /// ONNX if the model is installed, hashing otherwise.
    Auto,
    /// ONNX only; startup fails without the model.
    Onnx,
    /// Deterministic feature hashing, no model files.
    Hashing,
}

impl FromStr for EmbedderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "onnx" => Ok(Self::Onnx),
            "hashing" => Ok(Self::Hashing),
            other => Err(Error::Config(format!(
                "unknown embedder '{}' (expected auto, onnx or hashing)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for EmbedderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Onnx => write!(f, "onnx"),
            Self::Hashing => write!(f, "hashing"),
        }
    }
}

/// Top-level Stockwise configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockwiseConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    pub embedder: EmbedderKind,
    /// Embedding dimension (384 for paraphrase-multilingual-MiniLM-L12-v2).
    pub embedding_dim: usize,
    /// Records retrieved per query when the caller does not say.
    pub default_top_k: usize,
    /// Upper bound on a caller-supplied `top_k`.
    pub max_top_k: usize,
    /// Deadline for embedding + ranking a single query.
    pub embed_timeout: Duration,
    /// Deadline for the summarization call.
    pub summary_timeout: Duration,
    /// Retrievals allowed to run at once on the blocking pool.
    pub max_concurrency: usize,
    /// Stock level below which a product is flagged.
    pub low_stock_threshold: i64,
}

impl StockwiseConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_lookup(data_dir, |key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(data_dir: impl AsRef<Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut data_paths = DataPaths::new(data_dir);
        if let Some(catalog) = lookup("STOCKWISE_CATALOG") {
            data_paths.catalog = PathBuf::from(catalog);
        }

        let embedder = match lookup("STOCKWISE_EMBEDDER") {
            Some(v) => v.parse()?,
            None => EmbedderKind::Auto,
        };

        let default_concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        let config = Self {
            port: parse_var(&lookup, "PORT", 5000)?,
            data_paths,
            embedder,
            embedding_dim: parse_var(&lookup, "STOCKWISE_EMBEDDING_DIM", 384)?,
            default_top_k: parse_var(&lookup, "STOCKWISE_TOP_K", 3)?,
            max_top_k: parse_var(&lookup, "STOCKWISE_MAX_TOP_K", 12)?,
            embed_timeout: Duration::from_secs(parse_var(
                &lookup,
                "STOCKWISE_EMBED_TIMEOUT_SECS",
                30,
            )?),
            summary_timeout: Duration::from_secs(parse_var(
                &lookup,
                "STOCKWISE_SUMMARY_TIMEOUT_SECS",
                60,
            )?),
            max_concurrency: parse_var(&lookup, "STOCKWISE_MAX_CONCURRENCY", default_concurrency)?,
            low_stock_threshold: parse_var(&lookup, "STOCKWISE_LOW_STOCK_THRESHOLD", 10)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.embedding_dim == 0 {
            return Err(Error::Config("embedding dimension must be positive".into()));
        }
        if self.default_top_k == 0 || self.max_top_k == 0 {
            return Err(Error::Config("top_k limits must be at least 1".into()));
        }
        if self.default_top_k > self.max_top_k {
            return Err(Error::Config(format!(
                "default top_k {} exceeds max top_k {}",
                self.default_top_k, self.max_top_k
            )));
        }
        if self.max_concurrency == 0 {
            return Err(Error::Config("max concurrency must be at least 1".into()));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("invalid value for {}: '{}'", key, raw))),
        None => Ok(default),
    }
}
