use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::engine::EngineError;
use crate::metrics;
use crate::services::{assignment_service::ServiceError, AppState};
use crate::store::StoreError;

pub mod assignments;

/// Error body shared by all API handlers: `{ error, message, status }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "validation", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::Engine(e) => {
                let status = match e {
                    EngineError::UnknownQuestion(_) => StatusCode::NOT_FOUND,
                    EngineError::InvalidState { .. } => StatusCode::CONFLICT,
                    EngineError::InvalidAnswerShape { .. }
                    | EngineError::IncompleteGradingSet { .. }
                    | EngineError::InsufficientAnswers { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                };
                ApiError::new(status, e.kind(), message)
            }
            ServiceError::Store(e) => {
                let status = match e {
                    StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                    StoreError::Conflict(_) | StoreError::AlreadyExists(_) => StatusCode::CONFLICT,
                    StoreError::Corrupt { .. } | StoreError::Backend(_) => {
                        tracing::error!("Store failure: {}", message);
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                ApiError::new(status, e.kind(), message)
            }
            ServiceError::Authoring(_) => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "authoring", message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let json_response = json!({
            "error": self.kind,
            "message": self.message,
            "status": self.status.as_u16()
        });
        (self.status, Json(json_response)).into_response()
    }
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.assignments.store();
    let (status_code, status, store_status) = match store.ping().await {
        Ok(()) => (StatusCode::OK, "healthy", json!({ "status": "healthy" })),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "degraded",
            json!({ "status": "unhealthy", "error": e.to_string() }),
        ),
    };

    (
        status_code,
        Json(json!({
            "status": status,
            "service": "homework-api",
            "version": env!("CARGO_PKG_VERSION"),
            "store": {
                "backend": store.backend_name(),
                "health": store_status
            }
        })),
    )
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssignmentStatus;

    #[test]
    fn engine_errors_map_to_status_codes() {
        let invalid_state: ApiError = ServiceError::Engine(EngineError::InvalidState {
            expected: AssignmentStatus::Assigned,
            actual: AssignmentStatus::Graded,
        })
        .into();
        assert_eq!(invalid_state.status(), StatusCode::CONFLICT);

        let unknown: ApiError =
            ServiceError::Engine(EngineError::UnknownQuestion("q".to_string())).into();
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

        let incomplete: ApiError = ServiceError::Engine(EngineError::IncompleteGradingSet {
            reason: "missing".to_string(),
        })
        .into();
        assert_eq!(incomplete.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn store_errors_map_to_status_codes() {
        let conflict: ApiError = ServiceError::Store(StoreError::Conflict("a".to_string())).into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let backend: ApiError = ServiceError::Store(StoreError::Backend("down".to_string())).into();
        assert_eq!(backend.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
