use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder, HistogramVec,
    IntCounter, IntCounterVec, TextEncoder,
};

use crate::engine::EngineError;
use crate::models::{AssignmentStatus, QuestionVariant};
use crate::store::StoreError;

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Store Metrics
    pub static ref STORE_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "store_operations_total",
        "Total number of assignment store operations",
        &["operation", "status"]
    )
    .unwrap();

    pub static ref STORE_OPERATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "store_operation_duration_seconds",
        "Assignment store operation duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .unwrap();

    pub static ref STORE_CONFLICTS_TOTAL: IntCounter = register_int_counter!(
        "store_conflicts_total",
        "Number of saves rejected because of a concurrent modification"
    )
    .unwrap();

    // Business Metrics
    pub static ref ANSWERS_RECORDED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "answers_recorded_total",
        "Total number of answers recorded",
        &["variant"]
    )
    .unwrap();

    pub static ref ASSIGNMENT_TRANSITIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "assignment_transitions_total",
        "Total number of assignment status transitions",
        &["to"]
    )
    .unwrap();

    pub static ref ENGINE_REJECTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "engine_rejections_total",
        "Commands rejected by the lifecycle engine",
        &["kind"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Helper: track store operation with metrics
pub async fn track_store_operation<F, T>(operation: &str, future: F) -> Result<T, StoreError>
where
    F: std::future::Future<Output = Result<T, StoreError>>,
{
    let start = std::time::Instant::now();
    let result = future.await;
    let duration = start.elapsed().as_secs_f64();

    let status = match &result {
        Ok(_) => "success",
        Err(StoreError::Conflict(_)) => "conflict",
        Err(_) => "error",
    };

    STORE_OPERATIONS_TOTAL
        .with_label_values(&[operation, status])
        .inc();

    STORE_OPERATION_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration);

    result
}

pub fn record_answer_recorded(variant: QuestionVariant) {
    ANSWERS_RECORDED_TOTAL
        .with_label_values(&[variant.as_str()])
        .inc();
}

pub fn record_transition(to: AssignmentStatus) {
    ASSIGNMENT_TRANSITIONS_TOTAL
        .with_label_values(&[to.as_str()])
        .inc();
}

pub fn record_rejection(error: &EngineError) {
    ENGINE_REJECTIONS_TOTAL
        .with_label_values(&[error.kind()])
        .inc();
}

pub fn record_conflict() {
    STORE_CONFLICTS_TOTAL.inc();
}
