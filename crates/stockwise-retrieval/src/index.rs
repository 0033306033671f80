//! Build-once embedding index over the catalog.

use ndarray::{Array1, Array2};
use tracing::{debug, info};

use stockwise_catalog::ProductRecord;
use stockwise_core::{Error, Result};
use stockwise_infer::EmbedderBackend;

/// One normalized embedding row per catalog record.
///
/// Row `i` belongs to `records[i]`. Zero-norm rows stay zero and score 0
/// against any query.
pub struct EmbeddingIndex {
    records: Vec<ProductRecord>,
    /// Normalized embeddings, shape (N, dim).
    matrix: Array2<f32>,
}

impl EmbeddingIndex {
    /// Embed every record. The first failure aborts the whole build.
    pub fn build(records: Vec<ProductRecord>, embedder: &dyn EmbedderBackend) -> Result<Self> {
        let dim = embedder.dimension();
        let mut matrix = Array2::<f32>::zeros((records.len(), dim));

        for (row, record) in records.iter().enumerate() {
            let text = record.embedding_text();
            let embedding = embedder.embed(&text).map_err(|e| {
                Error::Embedding(format!(
                    "record {} ('{}'): {}",
                    record.id,
                    record.name,
                    cause(e)
                ))
            })?;

            if embedding.len() != dim {
                return Err(Error::Embedding(format!(
                    "record {} ('{}'): got {} dims, embedder declares {}",
                    record.id,
                    record.name,
                    embedding.len(),
                    dim
                )));
            }

            matrix.row_mut(row).assign(&normalized(embedding));
            debug!("Embedded record {} ('{}')", record.id, record.name);
        }

        info!(
            "Embedding index built: {} records, dim={}, embedder={}",
            records.len(),
            dim,
            embedder.name()
        );

        Ok(Self { records, matrix })
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.matrix.ncols()
    }

    /// Cosine similarity of `query` against every row, in catalog order.
    pub fn similarities(&self, query: &Array1<f32>) -> Result<Vec<f32>> {
        if query.len() != self.dimension() {
            return Err(Error::Embedding(format!(
                "query has {} dims, index has {}",
                query.len(),
                self.dimension()
            )));
        }

        let q = normalized(query.clone());
        Ok(self
            .matrix
            .dot(&q)
            .iter()
            .map(|&s| if s.is_finite() { s } else { 0.0 })
            .collect())
    }
}

/// Scale to unit length; zero and non-finite vectors become all-zero.
fn normalized(mut v: Array1<f32>) -> Array1<f32> {
    let norm = v.dot(&v).sqrt();
    if norm.is_finite() && norm > 1e-9 {
        v /= norm;
        v
    } else {
        Array1::zeros(v.len())
    }
}

fn cause(e: Error) -> String {
    match e {
        Error::Embedding(msg) => msg,
        other => other.to_string(),
    }
}
