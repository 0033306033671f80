//! API parity tests — response shapes that the chat-bot relay and the
//! stock dashboard read from the HTTP API.
//!
//! These serialize the service-boundary types directly, so no server
//! or catalog is needed.

use stockwise_catalog::{analyze_stock, Price, ProductRecord};
use stockwise_chat::LLMConfig;
use stockwise_runtime::{Insight, InsightError, InsightRequest};

fn record(id: usize, name: &str, stock: i64) -> ProductRecord {
    ProductRecord {
        id,
        name: name.into(),
        manufacturer: "Danone".into(),
        price: Price::Decimal(2.5),
        stock,
        description: "Yaourt nature".into(),
        average_lead_time: "2 jours".into(),
    }
}

/// The relay reads `insight` on success and `error` on failure.
#[test]
fn test_insight_response_shape() {
    let ok = serde_json::to_value(Insight {
        insight: "Le yaourt est en stock faible.".into(),
    })
    .unwrap();
    assert!(ok["insight"].is_string());
    assert_eq!(ok.as_object().unwrap().len(), 1);

    let err = serde_json::to_value(InsightError {
        error: "Query is required".into(),
    })
    .unwrap();
    assert_eq!(err["error"], "Query is required");
}

/// Clients send `{"query"}`; `top_k` is optional.
#[test]
fn test_insight_request_accepts_minimal_body() {
    let req: InsightRequest = serde_json::from_str(r#"{"query": "stock yaourt"}"#).unwrap();
    assert_eq!(req.query, "stock yaourt");
    assert_eq!(req.top_k, None);

    let req: InsightRequest = serde_json::from_str(r#"{"query": "x", "top_k": 5}"#).unwrap();
    assert_eq!(req.top_k, Some(5));
}

/// Dashboard stock table: list of products with numeric price/stock.
#[test]
fn test_product_shape() {
    let value = serde_json::to_value(record(3, "Yaourt", 12)).unwrap();
    for key in ["name", "manufacturer", "description", "average_lead_time"] {
        assert!(value[key].is_string(), "{} should be a string", key);
    }
    assert!(value["id"].is_u64());
    assert!(value["price"].is_f64());
    assert!(value["stock"].is_i64());
}

/// Dashboard alert panel: `low_stock` names and `remarks` lines.
#[test]
fn test_stock_report_shape() {
    let records = vec![record(0, "Yaourt", 2), record(1, "Beurre", 40)];
    let value = serde_json::to_value(analyze_stock(&records, 10)).unwrap();

    assert_eq!(value["threshold"], 10);
    assert_eq!(value["low_stock"], serde_json::json!(["Yaourt"]));
    assert_eq!(
        value["remarks"][0],
        "Alerte rupture ou stock faible (< 10) détectée pour : Yaourt."
    );
}

/// LLM status uses camelCase keys and never carries API keys.
#[test]
fn test_llm_status_shape() {
    let value = serde_json::to_value(LLMConfig::default().status()).unwrap();
    for key in [
        "llmAvailable",
        "groqConfigured",
        "openaiConfigured",
        "anthropicConfigured",
    ] {
        assert!(value[key].is_boolean(), "{} should be a bool", key);
    }
    let rendered = value.to_string();
    assert!(!rendered.contains("api_key"));
}
