//! Catalog loader for `{"products": [...]}` JSON documents.
//!
//! Entry keys are a fixed contract with the data producer:
//! `nom_article`, `societe_fabricant`, `prix`, `stock`,
//! `description_produit`, `delai_livraison_moyen`.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::{info, warn};

use crate::record::{Price, ProductRecord};
use stockwise_core::{Error, Result};

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    products: Vec<RawProduct>,
}

/// Entry as found in the source. Absent and `null` fields both become `None`.
#[derive(Debug, Deserialize)]
struct RawProduct {
    #[serde(default)]
    nom_article: Option<String>,
    #[serde(default)]
    societe_fabricant: Option<String>,
    #[serde(default)]
    prix: Option<Price>,
    #[serde(default, deserialize_with = "whole_number")]
    stock: Option<i64>,
    #[serde(default)]
    description_produit: Option<String>,
    #[serde(default)]
    delai_livraison_moyen: Option<String>,
}

impl RawProduct {
    fn into_record(self, id: usize) -> ProductRecord {
        ProductRecord {
            id,
            name: self.nom_article.unwrap_or_default(),
            manufacturer: self.societe_fabricant.unwrap_or_default(),
            price: self.prix.unwrap_or_default(),
            stock: self.stock.unwrap_or(0),
            description: self.description_produit.unwrap_or_default(),
            average_lead_time: self.delai_livraison_moyen.unwrap_or_default(),
        }
    }
}

/// Stock counts written as `5.0` are accepted; `5.5` is rejected.
fn whole_number<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    let Some(n) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    n.as_i64()
        .or_else(|| {
            n.as_f64()
                .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
                .map(|v| v as i64)
        })
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("stock must be a whole number, got {}", n)))
}

/// Load the catalog from a JSON file.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<ProductRecord>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::DataLoad(format!("{}: {}", path.display(), e)))?;
    let records = parse(&raw).map_err(|e| match e {
        Error::DataLoad(cause) => Error::DataLoad(format!("{}: {}", path.display(), cause)),
        other => other,
    })?;
    info!("Loaded {} products from {}", records.len(), path.display());
    Ok(records)
}

/// Parse a catalog document held in memory.
pub fn parse(json: &str) -> Result<Vec<ProductRecord>> {
    let document: CatalogDocument =
        serde_json::from_str(json).map_err(|e| Error::DataLoad(e.to_string()))?;

    let records: Vec<ProductRecord> = document
        .products
        .into_iter()
        .enumerate()
        .map(|(id, raw)| raw.into_record(id))
        .collect();

    warn_duplicate_names(&records);
    Ok(records)
}

fn warn_duplicate_names(records: &[ProductRecord]) {
    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    for record in records {
        if let Some(first) = seen.insert(record.name.as_str(), record.id) {
            warn!(
                "Duplicate product name '{}' (records {} and {}); both are kept",
                record.name, first, record.id
            );
        }
    }
}
