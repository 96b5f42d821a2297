//! Axum route handlers for the AI tools API.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::de::DeserializeOwned;

use crate::ai_tools::models::{
    AnalyzeCvRequest, AnalyzeCvTask, ApiResponse, EmailRequest, EmailTask,
    InterviewQuestionsRequest, InterviewQuestionsTask, JobDescriptionRequest, JobDescriptionTask,
    MatchJobsRequest, MatchJobsTask, QueryRequest, QueryTask, TaskRequest, TaskResponse,
};
use crate::documents::UploadedDocument;
use crate::errors::AppError;
use crate::state::AppState;

type TaskResult = Result<Json<ApiResponse<TaskResponse>>, AppError>;

const UPLOAD_FIELD: &str = "file";
const FALLBACK_MIME: &str = "application/octet-stream";

async fn respond(state: &AppState, request: TaskRequest) -> TaskResult {
    let data = state.tools.run(request).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// Unwraps a JSON body. Malformed input is a validation failure; an oversized
/// body stays a 413.
fn body<T: DeserializeOwned>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        AppError::from_body_rejection(rejection.status(), rejection.body_text())
    })
}

/// True for `multipart/form-data`, ignoring case and parameters.
fn is_multipart_form(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("multipart/form-data"))
}

/// POST /api/v1/ai-tools/analyze-cv
///
/// Accepts either a JSON body (`cv_text` / `file_content`) or a multipart form
/// with the CV under `file`. An uploaded file wins over text fields.
pub async fn handle_analyze_cv(State(state): State<AppState>, request: Request) -> TaskResult {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(is_multipart_form);

    let task = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::from_body_rejection(e.status(), e.body_text()))?;
        read_cv_form(multipart).await?
    } else {
        let payload = Json::<AnalyzeCvRequest>::from_request(request, &state).await;
        AnalyzeCvTask::new(body(payload)?, None)
    };

    respond(&state, TaskRequest::AnalyzeCv(task)).await
}

async fn read_cv_form(mut multipart: Multipart) -> Result<AnalyzeCvTask, AppError> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        AppError::from_body_rejection(
            e.status(),
            format!("Invalid multipart body: {}", e.body_text()),
        )
    };

    let mut fields = AnalyzeCvRequest::default();
    let mut document = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(UPLOAD_FIELD) => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field.content_type().unwrap_or(FALLBACK_MIME).to_string();
                let bytes = field.bytes().await.map_err(invalid)?;
                document = Some(UploadedDocument {
                    bytes,
                    mime_type,
                    filename,
                });
            }
            Some("cv_text") => fields.cv_text = Some(field.text().await.map_err(invalid)?),
            Some("file_content") => {
                fields.file_content = Some(field.text().await.map_err(invalid)?)
            }
            _ => {}
        }
    }

    Ok(AnalyzeCvTask::new(fields, document))
}

/// POST /api/v1/ai-tools/generate-job-description
pub async fn handle_generate_job_description(
    State(state): State<AppState>,
    payload: Result<Json<JobDescriptionRequest>, JsonRejection>,
) -> TaskResult {
    let task = JobDescriptionTask::try_from(body(payload)?)?;
    respond(&state, TaskRequest::GenerateJobDescription(task)).await
}

/// POST /api/v1/ai-tools/generate-interview-questions
pub async fn handle_generate_interview_questions(
    State(state): State<AppState>,
    payload: Result<Json<InterviewQuestionsRequest>, JsonRejection>,
) -> TaskResult {
    let task = InterviewQuestionsTask::from(body(payload)?);
    respond(&state, TaskRequest::GenerateInterviewQuestions(task)).await
}

/// POST /api/v1/ai-tools/generate-email
pub async fn handle_generate_email(
    State(state): State<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> TaskResult {
    let task = EmailTask::try_from(body(payload)?)?;
    respond(&state, TaskRequest::GenerateEmail(task)).await
}

/// POST /api/v1/ai-tools/match-jobs
pub async fn handle_match_jobs(
    State(state): State<AppState>,
    payload: Result<Json<MatchJobsRequest>, JsonRejection>,
) -> TaskResult {
    let task = MatchJobsTask::try_from(body(payload)?)?;
    respond(&state, TaskRequest::MatchJobs(task)).await
}

/// POST /api/v1/ai-tools/process-query
pub async fn handle_process_query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> TaskResult {
    let task = QueryTask::try_from(body(payload)?)?;
    respond(&state, TaskRequest::ProcessQuery(task)).await
}
