//! Catalog record type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One product entry from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Zero-based position in the catalog. Unique even when names collide.
    pub id: usize,
    pub name: String,
    pub manufacturer: String,
    pub price: Price,
    pub stock: i64,
    pub description: String,
    /// Free-form delivery-time description ("2 jours", "sous 48h").
    pub average_lead_time: String,
}

impl ProductRecord {
    /// Text submitted to the embedding model for this record.
    ///
    /// Field order is fixed: vectors built from a different layout are not
    /// comparable with an existing index.
    pub fn embedding_text(&self) -> String {
        format!(
            "{} {} {}€ {} unités {} livraison: {}",
            self.name,
            self.manufacturer,
            self.price,
            self.stock,
            self.description,
            self.average_lead_time
        )
    }
}

/// Catalog price, keeping whether the source wrote an integer or a decimal.
///
/// Displays the way the catalog wrote it: `7` stays `7`, `2.0` stays `2.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Integer(i64),
    Decimal(f64),
}

impl Price {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(v) => v as f64,
            Self::Decimal(v) => v,
        }
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::Decimal(0.0)
    }
}

impl From<f64> for Price {
    fn from(v: f64) -> Self {
        Self::Decimal(v)
    }
}

impl From<i64> for Price {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Integer(v) => write!(f, "{}", v),
            // integral decimals keep one place so 2.0 never collapses to 2
            Self::Decimal(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{:.1}", v)
            }
            Self::Decimal(v) => write!(f, "{}", v),
        }
    }
}
