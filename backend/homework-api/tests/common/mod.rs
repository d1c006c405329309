#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use homework_api::{
    config::Config, create_router, services::AppState, store::InMemoryAssignmentStore,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Router over a fresh in-memory store, same layers as the real app.
pub fn create_test_app() -> Router {
    create_test_app_with(Config::default())
}

pub fn create_test_app_with(config: Config) -> Router {
    init_tracing();
    let store = Arc::new(InMemoryAssignmentStore::new());
    let app_state = Arc::new(AppState::with_store(config, store));
    create_router(app_state)
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, json)
}

/// Two multiple choice questions (correct: A and C), one short answer.
pub fn physics_homework(id: &str, due_at: DateTime<Utc>) -> Value {
    json!({
        "id": id,
        "title": "Forces and motion",
        "description": "Chapter 3 review",
        "subject": "Physics",
        "due_at": due_at,
        "questions": [
            {
                "id": "q1",
                "prompt": "Unit of force?",
                "variant": "multiple_choice",
                "choices": ["Newton", "Joule", "Watt"],
                "correct_choice_index": 0
            },
            {
                "id": "q2",
                "prompt": "Acceleration due to gravity?",
                "variant": "multiple_choice",
                "choices": ["1 m/s2", "5 m/s2", "9.8 m/s2"],
                "correct_choice_index": 2
            },
            {
                "id": "q3",
                "prompt": "Explain Newton's third law",
                "variant": "short_answer"
            }
        ]
    })
}

pub fn tomorrow() -> DateTime<Utc> {
    Utc::now() + Duration::days(1)
}

pub fn yesterday() -> DateTime<Utc> {
    Utc::now() - Duration::days(1)
}

pub async fn create_assignment(app: &Router, body: Value) -> Value {
    let (status, json) = send(app, "POST", "/api/v1/assignments", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", json);
    json
}

pub async fn answer(app: &Router, id: &str, question_id: &str, value: &str) -> (StatusCode, Value) {
    send(
        app,
        "PUT",
        &format!("/api/v1/assignments/{}/answers/{}", id, question_id),
        Some(json!({ "value": value })),
    )
    .await
}
