//! Stockwise Catalog — product records, catalog loader, stock analysis.
//!
//! The catalog is read once at startup from a JSON document and is
//! read-only afterwards.

pub mod analysis;
pub mod loader;
pub mod record;

pub use analysis::{analyze_stock, StockReport, DEFAULT_LOW_STOCK_THRESHOLD};
pub use loader::{load, parse};
pub use record::{Price, ProductRecord};
