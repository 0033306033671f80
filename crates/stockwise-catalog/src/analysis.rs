//! Low-stock detection over the loaded catalog.

use serde::Serialize;

use crate::record::ProductRecord;

pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Stock alert summary for the whole catalog.
#[derive(Debug, Clone, Serialize)]
pub struct StockReport {
    pub threshold: i64,
    /// Names of products with `stock < threshold`, in catalog order.
    pub low_stock: Vec<String>,
    pub remarks: Vec<String>,
}

/// Flag every product whose stock is strictly below `threshold`.
pub fn analyze_stock(records: &[ProductRecord], threshold: i64) -> StockReport {
    let low_stock: Vec<String> = records
        .iter()
        .filter(|r| r.stock < threshold)
        .map(|r| r.name.clone())
        .collect();

    let remark = if low_stock.is_empty() {
        "Pas de rupture de stock détectée.".to_string()
    } else {
        format!(
            "Alerte rupture ou stock faible (< {}) détectée pour : {}.",
            threshold,
            low_stock.join(", ")
        )
    };

    StockReport {
        threshold,
        low_stock,
        remarks: vec![remark],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Price;

    fn record(id: usize, name: &str, stock: i64) -> ProductRecord {
        ProductRecord {
            id,
            name: name.into(),
            manufacturer: String::new(),
            price: Price::Decimal(1.0),
            stock,
            description: String::new(),
            average_lead_time: String::new(),
        }
    }

    #[test]
    fn test_low_stock_flagged() {
        let records = vec![record(0, "Lait", 5), record(1, "Pain", 50), record(2, "Oeufs", 0)];
        let report = analyze_stock(&records, DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(report.low_stock, vec!["Lait", "Oeufs"]);
        assert_eq!(
            report.remarks,
            vec!["Alerte rupture ou stock faible (< 10) détectée pour : Lait, Oeufs."]
        );
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let records = vec![record(0, "Beurre", 10)];
        let report = analyze_stock(&records, 10);
        assert!(report.low_stock.is_empty());
        assert_eq!(report.remarks, vec!["Pas de rupture de stock détectée."]);
    }

    #[test]
    fn test_empty_catalog() {
        let report = analyze_stock(&[], 10);
        assert!(report.low_stock.is_empty());
        assert_eq!(report.remarks.len(), 1);
    }
}
