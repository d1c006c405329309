use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::ApiError;
use crate::{
    extractors::AppJson,
    models::{AssignmentView, GradeRequest, NewAssignment},
    services::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecordAnswerRequest {
    #[serde(default)]
    pub value: String,
}

/// POST /api/v1/assignments
pub async fn create_assignment(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<NewAssignment>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let assignment = state.assignments.create(req).await?;
    let view = AssignmentView::derive(assignment, chrono::Utc::now());
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/assignments/{id}
pub async fn get_assignment(
    State(state): State<Arc<AppState>>,
    Path(assignment_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.assignments.get(&assignment_id).await?;
    Ok(Json(view))
}

/// PUT /api/v1/assignments/{id}/answers/{question_id}
pub async fn record_answer(
    State(state): State<Arc<AppState>>,
    Path((assignment_id, question_id)): Path<(String, String)>,
    AppJson(req): AppJson<RecordAnswerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let assignment = state
        .assignments
        .record_answer(&assignment_id, &question_id, &req.value)
        .await?;
    Ok(Json(AssignmentView::derive(assignment, chrono::Utc::now())))
}

/// POST /api/v1/assignments/{id}/submit
pub async fn submit_assignment(
    State(state): State<Arc<AppState>>,
    Path(assignment_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let assignment = state.assignments.submit(&assignment_id).await?;
    Ok(Json(AssignmentView::derive(assignment, chrono::Utc::now())))
}

/// POST /api/v1/assignments/{id}/grade
pub async fn grade_assignment(
    State(state): State<Arc<AppState>>,
    Path(assignment_id): Path<String>,
    AppJson(req): AppJson<GradeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let assignment = state
        .assignments
        .grade(&assignment_id, &req.results)
        .await?;
    Ok(Json(AssignmentView::derive(assignment, chrono::Utc::now())))
}
