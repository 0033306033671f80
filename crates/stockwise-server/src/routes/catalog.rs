//! Catalog and status routes for dashboards.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::state::AppState;
use stockwise_catalog::StockReport;
use stockwise_runtime::ServiceStatus;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", get(list_products))
        .route("/stock/alerts", get(stock_alerts))
        .route("/status", get(status))
}

/// GET /api/products — the loaded catalog in id order.
async fn list_products(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let products = state.service.products();
    Json(serde_json::json!({
        "products": products,
        "total": products.len(),
    }))
}

#[derive(Debug, Deserialize)]
struct AlertParams {
    threshold: Option<i64>,
}

/// GET /api/stock/alerts?threshold=n
async fn stock_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertParams>,
) -> Json<StockReport> {
    Json(state.service.stock_report(params.threshold))
}

/// GET /api/status
async fn status(State(state): State<Arc<AppState>>) -> Json<ServiceStatus> {
    Json(state.service.status())
}
