use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod engine;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

pub use config::Config;
pub use engine::{AssignmentEngine, EngineError};
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/v1/assignments", assignment_routes())
        .with_state(app_state)
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::trace::request_id_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn assignment_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(handlers::assignments::create_assignment))
        .route("/{id}", get(handlers::assignments::get_assignment))
        .route(
            "/{id}/answers/{question_id}",
            put(handlers::assignments::record_answer),
        )
        .route("/{id}/submit", post(handlers::assignments::submit_assignment))
        .route("/{id}/grade", post(handlers::assignments::grade_assignment))
}
