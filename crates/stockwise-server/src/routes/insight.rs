//! Insight route — POST /generate_insight.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::debug;

use super::ApiError;
use crate::state::AppState;
use stockwise_core::Error;
use stockwise_runtime::{Insight, InsightRequest};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/generate_insight", post(generate_insight))
}

/// POST /generate_insight — `{"query", "top_k"?}` → `{"insight"}`.
///
/// A request without a JSON body is treated as one without a query.
async fn generate_insight(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InsightRequest>, JsonRejection>,
) -> Result<Json<Insight>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => InsightRequest::default(),
        Err(rejection) => {
            debug!("Rejected insight body: {}", rejection.body_text());
            return Err(Error::Validation(rejection.body_text()).into());
        }
    };

    let insight = state
        .service
        .generate_insight(&request.query, request.top_k)
        .await?;
    Ok(Json(insight))
}
