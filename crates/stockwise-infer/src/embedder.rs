//! Embedding engine trait and the model-free hashing backend.
//!
//! The `EmbedderBackend` trait abstracts over embedding generation.
//! Implementations:
//! - `OnnxEmbedder`: ONNX Runtime with a sentence-transformers export (feature `onnx`)
//! - `HashingEmbedder`: signed feature hashing of word tokens, no model files

use ndarray::Array1;
use sha2::{Digest, Sha256};

use stockwise_core::{Error, Result};

/// Trait for embedding backends.
///
/// Index build and query embedding must go through the same instance;
/// vectors from different backends live in unrelated spaces.
pub trait EmbedderBackend: Send + Sync {
    /// Generate an embedding for a text string.
    fn embed(&self, text: &str) -> Result<Array1<f32>>;

    /// Generate embeddings for a batch of texts. Fails on the first error.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Array1<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;

    /// Short backend identifier for logs and status output.
    fn name(&self) -> &str;
}

/// Deterministic bag-of-words embedder.
///
/// Each lowercased alphanumeric token is hashed with SHA-256; the first
/// eight bytes pick a bucket and the ninth a sign. Output is L2-normalized,
/// so texts with no tokens embed to the zero vector.
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn bucket(&self, token: &str) -> (usize, f32) {
        let digest = Sha256::digest(token.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let index = (u64::from_le_bytes(head) % self.dim as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }
}

impl EmbedderBackend for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Array1<f32>> {
        let mut embedding = Array1::<f32>::zeros(self.dim);
        let lowered = text.to_lowercase();

        for token in lowered.split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            let (index, sign) = self.bucket(token);
            embedding[index] += sign;
        }

        let norm = embedding.dot(&embedding).sqrt();
        if !norm.is_finite() {
            return Err(Error::Embedding("non-finite hashing embedding".into()));
        }
        if norm > 0.0 {
            embedding /= norm;
        }
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        "hashing"
    }
}
