//! HTTP route handlers.

pub mod catalog;
pub mod insight;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;
use stockwise_core::Error;
use stockwise_runtime::InsightError;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(insight::routes())
        .nest("/api", catalog::routes())
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Service error rendered as `{"error": ...}` with a matching status.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Summarization(_) => StatusCode::BAD_GATEWAY,
            Error::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed ({}): {}", status.as_u16(), self.0);
        }
        let body = InsightError {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{app, get, send, Reply};
    use super::ApiError;
    use axum::http::StatusCode;
    use std::time::Duration;
    use stockwise_core::Error;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (Error::Validation("Query is required".into()), StatusCode::BAD_REQUEST),
            (Error::Embedding("model".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::Internal("join".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::Summarization("401".into()), StatusCode::BAD_GATEWAY),
            (
                Error::Timeout {
                    operation: "embedding",
                    after: Duration::from_secs(30),
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError(error).status(), expected);
        }
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(Reply::Echo), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
