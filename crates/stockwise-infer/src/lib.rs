//! Stockwise Infer — embedding backends and query cache.
//!
//! Provides the `EmbedderBackend` trait for generating embeddings.
//! When the `onnx` feature is enabled and model files are present,
//! `OnnxEmbedder` loads a sentence-transformers export. Without it,
//! `HashingEmbedder` gives deterministic lexical vectors.

pub mod cache;
pub mod embedder;
pub mod onnx_embedder;

pub use cache::QueryCache;
pub use embedder::{EmbedderBackend, HashingEmbedder};

#[cfg(feature = "onnx")]
pub use onnx_embedder::OnnxEmbedder;

use std::path::Path;
use std::sync::Arc;

use stockwise_core::{EmbedderKind, Result};

/// Create the embedder requested by configuration.
///
/// `Onnx` fails when the model cannot be loaded. `Auto` tries ONNX first
/// and falls back to `HashingEmbedder` with a warning.
pub fn create_embedder(
    kind: EmbedderKind,
    model_dir: &Path,
    dim: usize,
) -> Result<Arc<dyn EmbedderBackend>> {
    match kind {
        EmbedderKind::Hashing => {
            tracing::info!("Using hashing embedder (dim={})", dim);
            Ok(Arc::new(HashingEmbedder::new(dim)))
        }
        EmbedderKind::Onnx => load_onnx(model_dir, dim),
        EmbedderKind::Auto => match load_onnx(model_dir, dim) {
            Ok(embedder) => Ok(embedder),
            Err(e) => {
                tracing::warn!("ONNX embedder unavailable: {}. Falling back to hashing embedder.", e);
                Ok(Arc::new(HashingEmbedder::new(dim)))
            }
        },
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(model_dir: &Path, dim: usize) -> Result<Arc<dyn EmbedderBackend>> {
    let embedder = OnnxEmbedder::load(model_dir, dim)?;
    tracing::info!("Using ONNX embedder (dim={})", embedder.dimension());
    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(model_dir: &Path, _dim: usize) -> Result<Arc<dyn EmbedderBackend>> {
    Err(stockwise_core::Error::Config(format!(
        "built without the onnx feature; cannot load model from {}",
        model_dir.display()
    )))
}
