pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ai_tools::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // AI tools API
        .route(
            "/api/v1/ai-tools/analyze-cv",
            post(handlers::handle_analyze_cv).layer(upload_limit),
        )
        .route(
            "/api/v1/ai-tools/generate-job-description",
            post(handlers::handle_generate_job_description),
        )
        .route(
            "/api/v1/ai-tools/generate-interview-questions",
            post(handlers::handle_generate_interview_questions),
        )
        .route(
            "/api/v1/ai-tools/generate-email",
            post(handlers::handle_generate_email),
        )
        .route(
            "/api/v1/ai-tools/match-jobs",
            post(handlers::handle_match_jobs),
        )
        .route(
            "/api/v1/ai-tools/process-query",
            post(handlers::handle_process_query),
        )
        .with_state(state)
}
