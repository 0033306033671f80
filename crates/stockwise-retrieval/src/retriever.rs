//! Top-k cosine retrieval over the embedding index.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::context::format_context;
use crate::index::EmbeddingIndex;
use stockwise_catalog::ProductRecord;
use stockwise_core::{Error, Result};
use stockwise_infer::EmbedderBackend;

/// A catalog record with its similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    pub score: f32,
    pub record: ProductRecord,
}

/// Ranks catalog records against free-text queries.
///
/// Holds the embedder used to build the index so queries always land in
/// the same vector space. Nothing is mutated after construction.
pub struct Retriever {
    index: EmbeddingIndex,
    embedder: Arc<dyn EmbedderBackend>,
}

impl Retriever {
    /// Build the index for `records` and wrap it for querying.
    pub fn build(records: Vec<ProductRecord>, embedder: Arc<dyn EmbedderBackend>) -> Result<Self> {
        let index = EmbeddingIndex::build(records, embedder.as_ref())?;
        Ok(Self { index, embedder })
    }

    /// Best `k` records for `query`, highest score first.
    ///
    /// Ties keep catalog order. `k` larger than the catalog returns every
    /// record; an empty catalog returns nothing without embedding the query.
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RankedResult>> {
        if k == 0 {
            return Err(Error::Validation("k must be at least 1".into()));
        }
        if self.index.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query)?;
        let scores = self.index.similarities(&query_embedding)?;

        let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);

        let records = self.index.records();
        let results: Vec<RankedResult> = ranked
            .into_iter()
            .map(|(row, score)| RankedResult {
                score,
                record: records[row].clone(),
            })
            .collect();

        debug!(
            "Retrieved {} of {} records (top score {:.3})",
            results.len(),
            records.len(),
            results.first().map(|r| r.score).unwrap_or(0.0)
        );
        Ok(results)
    }

    /// `retrieve` followed by `format_context`.
    pub fn retrieve_context(&self, query: &str, k: usize) -> Result<String> {
        Ok(format_context(&self.retrieve(query, k)?))
    }

    pub fn records(&self) -> &[ProductRecord] {
        self.index.records()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn embedder(&self) -> &dyn EmbedderBackend {
        self.embedder.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use std::collections::HashMap;
    use stockwise_infer::HashingEmbedder;

    /// Maps exact texts to vectors; unknown text fails.
    struct TableEmbedder {
        table: HashMap<String, Vec<f32>>,
        dim: usize,
    }

    impl EmbedderBackend for TableEmbedder {
        fn embed(&self, text: &str) -> Result<Array1<f32>> {
            self.table
                .get(text)
                .map(|v| Array1::from_vec(v.clone()))
                .ok_or_else(|| Error::Embedding(format!("no vector for '{}'", text)))
        }

        fn dimension(&self) -> usize {
            self.dim
        }

        fn name(&self) -> &str {
            "table"
        }
    }

    fn product(id: usize, name: &str, stock: i64, price: f64, description: &str) -> ProductRecord {
        ProductRecord {
            id,
            name: name.into(),
            manufacturer: "Coop".into(),
            price: price.into(),
            stock,
            description: description.into(),
            average_lead_time: "2 jours".into(),
        }
    }

    fn catalog() -> Vec<ProductRecord> {
        vec![
            product(0, "Lait", 5, 1.2, "Lait entier, stock faible, risque de rupture"),
            product(1, "Pain", 50, 0.9, "Baguette tradition cuite au four"),
            product(2, "Café", 30, 4.5, "Café moulu arabica torréfié"),
            product(3, "Riz", 80, 2.0, "Riz basmati long grain"),
        ]
    }

    fn hashing_retriever() -> Retriever {
        Retriever::build(catalog(), Arc::new(HashingEmbedder::new(384))).unwrap()
    }

    /// Index vectors along axes so scores are known exactly.
    fn table_retriever(records: Vec<ProductRecord>, vectors: &[Vec<f32>]) -> Retriever {
        let dim = vectors[0].len();
        let mut table: HashMap<String, Vec<f32>> = records
            .iter()
            .zip(vectors)
            .map(|(r, v)| (r.embedding_text(), v.clone()))
            .collect();
        table.insert("q-first".into(), vectors[0].clone());
        table.insert("q-zero".into(), vec![0.0; dim]);
        Retriever::build(records, Arc::new(TableEmbedder { table, dim })).unwrap()
    }

    #[test]
    fn test_exactly_k_results_sorted() {
        let retriever = hashing_retriever();
        for k in 1..=retriever.len() {
            let results = retriever.retrieve("café arabica", k).unwrap();
            assert_eq!(results.len(), k);
            assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }

    #[test]
    fn test_k_above_catalog_returns_all() {
        let retriever = hashing_retriever();
        let results = retriever.retrieve("riz", 100).unwrap();
        assert_eq!(results.len(), 4);
    }

    #[test]
    fn test_k_zero_rejected() {
        let retriever = hashing_retriever();
        assert!(matches!(retriever.retrieve("riz", 0), Err(Error::Validation(_))));
    }

    #[test]
    fn test_low_stock_query_ranks_lait_first() {
        let retriever = hashing_retriever();
        let results = retriever.retrieve("produit en rupture de stock", 1).unwrap();
        assert_eq!(results[0].record.name, "Lait");
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let retriever = hashing_retriever();
        let a: Vec<usize> = retriever
            .retrieve("baguette", 4)
            .unwrap()
            .iter()
            .map(|r| r.record.id)
            .collect();
        let b: Vec<usize> = retriever
            .retrieve("baguette", 4)
            .unwrap()
            .iter()
            .map(|r| r.record.id)
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_identical_vector_scores_one() {
        let records = catalog();
        let retriever = table_retriever(
            records,
            &[
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
                vec![0.0, 1.0, 1.0],
            ],
        );
        let results = retriever.retrieve("q-first", 2).unwrap();
        assert_eq!(results[0].record.name, "Lait");
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_identical_vector_wins_tie_by_catalog_order() {
        // Lait and Café share the query's exact vector
        let retriever = table_retriever(
            catalog(),
            &[
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![1.0, 0.0, 0.0],
                vec![0.0, 0.0, 1.0],
            ],
        );
        let results = retriever.retrieve("q-first", 4).unwrap();
        assert_eq!(results[0].record.id, 0);
        assert_eq!(results[1].record.id, 2);
        assert!((results[0].score - 1.0).abs() < 1e-6);
        assert!((results[1].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let retriever = table_retriever(
            catalog(),
            &[
                vec![1.0, 0.0],
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![2.0, 0.0],
            ],
        );
        let ids: Vec<usize> = retriever
            .retrieve("q-first", 4)
            .unwrap()
            .iter()
            .map(|r| r.record.id)
            .collect();
        assert_eq!(ids, vec![0, 1, 3, 2]);
    }

    #[test]
    fn test_zero_query_scores_zero() {
        let retriever = table_retriever(catalog(), &vec![vec![1.0, 0.0]; 4]);
        let results = retriever.retrieve("q-zero", 4).unwrap();
        assert!(results.iter().all(|r| r.score == 0.0));
        let ids: Vec<usize> = results.iter().map(|r| r.record.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_query_embedding_failure() {
        let retriever = table_retriever(catalog(), &vec![vec![1.0, 0.0]; 4]);
        assert!(matches!(
            retriever.retrieve("unknown text", 1),
            Err(Error::Embedding(_))
        ));
    }

    #[test]
    fn test_empty_catalog_returns_empty() {
        let embedder = Arc::new(TableEmbedder {
            table: HashMap::new(),
            dim: 2,
        });
        let retriever = Retriever::build(Vec::new(), embedder).unwrap();
        // The table would fail this query; empty catalogs never embed it.
        assert!(retriever.retrieve("anything", 3).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_names_keep_separate_vectors() {
        let records = vec![
            product(0, "Lait", 5, 1.2, "entier"),
            product(1, "Lait", 40, 0.8, "écrémé"),
        ];
        let retriever = table_retriever(records, &[vec![1.0, 0.0], vec![0.0, 1.0]]);
        let results = retriever.retrieve("q-first", 2).unwrap();
        assert_eq!(results[0].record.id, 0);
        assert!((results[0].score - 1.0).abs() < 1e-6);
        assert_eq!(results[1].record.id, 1);
        assert!(results[1].score.abs() < 1e-6);
    }

    #[test]
    fn test_retrieve_context_formats_ranking() {
        let retriever = hashing_retriever();
        let context = retriever.retrieve_context("produit en rupture de stock", 2).unwrap();
        assert!(context.starts_with("Nom de l'article : Lait\n"));
        assert_eq!(context.matches("Nom de l'article : ").count(), 2);
    }
}
