//! Wire requests, validated task inputs, and response envelopes for the AI tools.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai_tools::reducer::CvAnalysisRecord;
use crate::documents::UploadedDocument;
use crate::errors::AppError;
use crate::llm_client::SamplingParams;

// ────────────────────────────────────────────────────────────────────────────
// Task kinds and their fixed sampling parameters
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    AnalyzeCv,
    GenerateJobDescription,
    GenerateInterviewQuestions,
    GenerateEmail,
    MatchJobs,
    ProcessQuery,
}

impl TaskKind {
    /// Low temperature for extraction and matching, higher for free writing.
    /// Not overridable by callers.
    pub fn sampling(self) -> SamplingParams {
        let (temperature, max_output_tokens) = match self {
            TaskKind::AnalyzeCv => (0.3, 1500),
            TaskKind::GenerateJobDescription => (0.7, 1000),
            TaskKind::GenerateInterviewQuestions => (0.6, 1200),
            TaskKind::GenerateEmail => (0.5, 800),
            TaskKind::MatchJobs => (0.3, 1500),
            TaskKind::ProcessQuery => (0.7, 800),
        };
        SamplingParams {
            temperature,
            max_output_tokens,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskKind::AnalyzeCv => "CV analysis",
            TaskKind::GenerateJobDescription => "Job description generation",
            TaskKind::GenerateInterviewQuestions => "Interview question generation",
            TaskKind::GenerateEmail => "Email generation",
            TaskKind::MatchJobs => "Job matching",
            TaskKind::ProcessQuery => "Query processing",
        }
    }
}

/// Treats empty and whitespace-only strings as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_blank_list(values: Option<Vec<String>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .filter(|v| !v.trim().is_empty())
        .collect()
}

fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
    non_blank(value).ok_or_else(|| AppError::Validation(message.to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Wire requests (every field optional; validation happens on conversion)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeCvRequest {
    pub cv_text: Option<String>,
    pub file_content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobDescriptionRequest {
    pub position: Option<String>,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub requirements: Option<String>,
    pub experience_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterviewQuestionsRequest {
    pub position: Option<String>,
    pub candidate_id: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience_level: Option<String>,
    pub question_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailRequest {
    pub email_purpose: Option<String>,
    pub recipient_type: Option<String>,
    pub recipient_id: Option<String>,
    pub context: Option<String>,
    pub tone: Option<String>,
    pub sender_name: Option<String>,
    pub sender_role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchJobsRequest {
    pub candidate_id: Option<String>,
    pub cv_analysis: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    pub query: Option<String>,
    pub context: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Validated task inputs
// ────────────────────────────────────────────────────────────────────────────

/// CV text can only be checked once an attached document is normalized, so
/// this variant is validated by the orchestrator rather than on conversion.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeCvTask {
    pub text: Option<String>,
    pub document: Option<UploadedDocument>,
}

impl AnalyzeCvTask {
    pub fn new(request: AnalyzeCvRequest, document: Option<UploadedDocument>) -> Self {
        Self {
            text: non_blank(request.cv_text).or_else(|| non_blank(request.file_content)),
            document,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobDescriptionTask {
    pub position: String,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub requirements: Option<String>,
    pub experience_level: Option<String>,
}

impl TryFrom<JobDescriptionRequest> for JobDescriptionTask {
    type Error = AppError;

    fn try_from(req: JobDescriptionRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            position: required(req.position, "Position title is required")?,
            company_name: non_blank(req.company_name),
            industry: non_blank(req.industry),
            requirements: non_blank(req.requirements),
            experience_level: non_blank(req.experience_level),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterviewQuestionsTask {
    pub position: Option<String>,
    pub candidate_id: Option<String>,
    pub skills: Vec<String>,
    pub experience_level: Option<String>,
    pub question_types: Vec<String>,
}

impl From<InterviewQuestionsRequest> for InterviewQuestionsTask {
    fn from(req: InterviewQuestionsRequest) -> Self {
        Self {
            position: non_blank(req.position),
            candidate_id: non_blank(req.candidate_id),
            skills: non_blank_list(req.skills),
            experience_level: non_blank(req.experience_level),
            question_types: non_blank_list(req.question_types),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientType {
    Candidate,
    Company,
}

impl RecipientType {
    /// Unknown recipient types are ignored rather than rejected.
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "candidate" => Some(RecipientType::Candidate),
            "company" => Some(RecipientType::Company),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailTask {
    pub email_purpose: String,
    pub recipient: Option<(RecipientType, String)>,
    pub context: Option<String>,
    pub tone: Option<String>,
    pub sender_name: Option<String>,
    pub sender_role: Option<String>,
}

impl TryFrom<EmailRequest> for EmailTask {
    type Error = AppError;

    fn try_from(req: EmailRequest) -> Result<Self, Self::Error> {
        let email_purpose = required(req.email_purpose, "Email purpose is required")?;
        let recipient = non_blank(req.recipient_type)
            .and_then(|t| RecipientType::parse(&t))
            .zip(non_blank(req.recipient_id));
        Ok(Self {
            email_purpose,
            recipient,
            context: non_blank(req.context),
            tone: non_blank(req.tone),
            sender_name: non_blank(req.sender_name),
            sender_role: non_blank(req.sender_role),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchJobsTask {
    pub candidate_id: Option<String>,
    pub cv_analysis: Option<Value>,
}

impl TryFrom<MatchJobsRequest> for MatchJobsTask {
    type Error = AppError;

    fn try_from(req: MatchJobsRequest) -> Result<Self, Self::Error> {
        let candidate_id = non_blank(req.candidate_id);
        let cv_analysis = req.cv_analysis.filter(|v| !v.is_null());
        if candidate_id.is_none() && cv_analysis.is_none() {
            return Err(AppError::Validation(
                "Candidate ID or CV analysis is required".to_string(),
            ));
        }
        Ok(Self {
            candidate_id,
            cv_analysis,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryTask {
    pub query: String,
    pub context: Option<String>,
}

impl TryFrom<QueryRequest> for QueryTask {
    type Error = AppError;

    fn try_from(req: QueryRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            query: required(req.query, "Query is required")?,
            context: non_blank(req.context),
        })
    }
}

/// One validated request per task kind. Dispatch is a closed match over this.
#[derive(Debug, Clone)]
pub enum TaskRequest {
    AnalyzeCv(AnalyzeCvTask),
    GenerateJobDescription(JobDescriptionTask),
    GenerateInterviewQuestions(InterviewQuestionsTask),
    GenerateEmail(EmailTask),
    MatchJobs(MatchJobsTask),
    ProcessQuery(QueryTask),
}

impl TaskRequest {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskRequest::AnalyzeCv(_) => TaskKind::AnalyzeCv,
            TaskRequest::GenerateJobDescription(_) => TaskKind::GenerateJobDescription,
            TaskRequest::GenerateInterviewQuestions(_) => TaskKind::GenerateInterviewQuestions,
            TaskRequest::GenerateEmail(_) => TaskKind::GenerateEmail,
            TaskRequest::MatchJobs(_) => TaskKind::MatchJobs,
            TaskRequest::ProcessQuery(_) => TaskKind::ProcessQuery,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Responses
// ────────────────────────────────────────────────────────────────────────────

/// `{ "success": true, "data": ... }`. Failures are rendered by `AppError`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeCvResponse {
    pub analysis: CvAnalysisRecord,
    pub raw_analysis: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobDescriptionResponse {
    pub job_description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewQuestionsResponse {
    pub interview_questions: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailResponse {
    pub email_template: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchJobsResponse {
    pub job_matches: String,
    pub total_jobs_analyzed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub response: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TaskResponse {
    AnalyzeCv(AnalyzeCvResponse),
    JobDescription(JobDescriptionResponse),
    InterviewQuestions(InterviewQuestionsResponse),
    Email(EmailResponse),
    MatchJobs(MatchJobsResponse),
    Query(QueryResponse),
}
