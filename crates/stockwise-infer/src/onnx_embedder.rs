//! ONNX-based embedding engine for sentence-transformers exports.
//!
//! Targets `paraphrase-multilingual-MiniLM-L12-v2` (384-dim, French, English
//! and Arabic queries in one space). Requires the `onnx` feature.

#[cfg(feature = "onnx")]
mod inner {
    use std::path::Path;

    use ndarray::Array1;
    use ort::session::Session;
    use ort::value::Tensor;
    use parking_lot::Mutex;
    use tokenizers::Tokenizer;
    use tracing::{debug, info};

    use crate::cache::QueryCache;
    use crate::embedder::EmbedderBackend;
    use stockwise_core::{Error, Result};

    /// Maximum sequence length for the model.
    const MAX_SEQ_LEN: usize = 128;

    fn embed_err(context: &str, e: impl std::fmt::Display) -> Error {
        Error::Embedding(format!("{}: {}", context, e))
    }

    /// ONNX embedding engine with mean pooling and a query cache.
    pub struct OnnxEmbedder {
        session: Mutex<Session>,
        tokenizer: Tokenizer,
        cache: QueryCache,
        dimension: usize,
    }

    impl OnnxEmbedder {
        /// Load an ONNX model and tokenizer from the given directory.
        ///
        /// Expects `model_dir/model.onnx` and `model_dir/tokenizer.json`.
        pub fn load(model_dir: &Path, dimension: usize) -> Result<Self> {
            let model_path = model_dir.join("model.onnx");
            let tokenizer_path = model_dir.join("tokenizer.json");

            if !model_path.exists() {
                return Err(Error::Embedding(format!(
                    "Model not found: {}",
                    model_path.display()
                )));
            }
            if !tokenizer_path.exists() {
                return Err(Error::Embedding(format!(
                    "Tokenizer not found: {}",
                    tokenizer_path.display()
                )));
            }

            // With load-dynamic, ORT_DYLIB_PATH must point to libonnxruntime.so
            ort::init().commit();

            let session = Session::builder()
                .map_err(|e| embed_err("Failed to create session builder", e))?
                .with_intra_threads(2)
                .map_err(|e| embed_err("Failed to set threads", e))?
                .commit_from_file(&model_path)
                .map_err(|e| embed_err("Failed to load ONNX model", e))?;

            let tokenizer = Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| embed_err("Failed to load tokenizer", e))?;

            info!(
                "ONNX embedder loaded: dim={}, model={}",
                dimension,
                model_path.display()
            );

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
                cache: QueryCache::default_cache(),
                dimension,
            })
        }

        fn infer(&self, text: &str) -> Result<Array1<f32>> {
            let encoding = self
                .tokenizer
                .encode(text, true)
                .map_err(|e| embed_err("Tokenization failed", e))?;

            let seq_len = encoding.get_ids().len().min(MAX_SEQ_LEN);
            let input_ids = &encoding.get_ids()[..seq_len];
            let attention_mask = &encoding.get_attention_mask()[..seq_len];

            let ids_data: Vec<i64> = input_ids.iter().map(|&id| id as i64).collect();
            let mask_data: Vec<i64> = attention_mask.iter().map(|&m| m as i64).collect();
            let type_ids_data: Vec<i64> = vec![0i64; seq_len];

            let ids_tensor = Tensor::from_array(([1usize, seq_len], ids_data))
                .map_err(|e| embed_err("Failed to create ids tensor", e))?;
            let mask_tensor = Tensor::from_array(([1usize, seq_len], mask_data))
                .map_err(|e| embed_err("Failed to create mask tensor", e))?;
            let type_ids_tensor = Tensor::from_array(([1usize, seq_len], type_ids_data))
                .map_err(|e| embed_err("Failed to create type_ids tensor", e))?;

            let mut session = self.session.lock();
            let outputs = session
                .run(ort::inputs![ids_tensor, mask_tensor, type_ids_tensor])
                .map_err(|e| embed_err("ONNX inference failed", e))?;

            // [1, seq_len, dim] token embeddings or [1, dim] pooled output
            let (shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| embed_err("Failed to extract output tensor", e))?;
            let dims: Vec<i64> = shape.iter().copied().collect();

            let embedding = match dims.as_slice() {
                [_, _, dim] => {
                    let dim = *dim as usize;
                    let mask_sum: f32 = attention_mask.iter().map(|&m| m as f32).sum();
                    if mask_sum < 1e-9 {
                        return Err(Error::Embedding("empty attention mask".into()));
                    }
                    let mut pooled = Array1::<f32>::zeros(dim);
                    for (i, &m) in attention_mask.iter().enumerate() {
                        if m > 0 {
                            let row = &data[i * dim..(i + 1) * dim];
                            for (acc, &v) in pooled.iter_mut().zip(row) {
                                *acc += v;
                            }
                        }
                    }
                    pooled / mask_sum
                }
                [_, dim] => Array1::from_vec(data[..*dim as usize].to_vec()),
                other => {
                    return Err(Error::Embedding(format!(
                        "Unexpected output shape: {:?}",
                        other
                    )))
                }
            };

            if embedding.len() != self.dimension {
                return Err(Error::Embedding(format!(
                    "model produced {} dims, expected {}",
                    embedding.len(),
                    self.dimension
                )));
            }
            Ok(embedding)
        }
    }

    impl EmbedderBackend for OnnxEmbedder {
        fn embed(&self, text: &str) -> Result<Array1<f32>> {
            if let Some(cached) = self.cache.get(text) {
                debug!("Embedding cache hit");
                return Ok(cached);
            }

            let embedding = self.infer(text)?;
            self.cache.put(text.to_string(), embedding.clone());
            Ok(embedding)
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn name(&self) -> &str {
            "onnx"
        }
    }
}

#[cfg(feature = "onnx")]
pub use inner::OnnxEmbedder;
