//! AI tools orchestration: one handler per task kind.
//!
//! Flow: validate → resolve referenced entities → normalize attached document →
//!       build prompt → generate → reduce (CV analysis only) → response.
//!
//! Entity misses only thin the prompt. Store failures and generation failures
//! abort the task; there is no partial result.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::ai_tools::models::{
    AnalyzeCvResponse, AnalyzeCvTask, EmailResponse, EmailTask, InterviewQuestionsResponse,
    InterviewQuestionsTask, JobDescriptionResponse, JobDescriptionTask, MatchJobsResponse,
    MatchJobsTask, QueryResponse, QueryTask, RecipientType, TaskKind, TaskRequest, TaskResponse,
};
use crate::ai_tools::prompts::{
    build_cv_analysis_prompt, build_email_prompt, build_interview_prompt,
    build_job_description_prompt, build_match_jobs_prompt, build_query_prompt,
    candidate_profile, Recipient, MAX_MATCH_JOBS,
};
use crate::ai_tools::reducer::AnalysisReducer;
use crate::documents::DocumentNormalizer;
use crate::errors::AppError;
use crate::llm_client::{LlmError, PromptPair, TextGenerator};
use crate::models::candidate::CandidateRow;
use crate::models::company::CompanyRow;
use crate::store::EntityStore;

/// Collaborators shared by every task. Cheap to clone; carried in `AppState`.
#[derive(Clone)]
pub struct AiTools {
    store: Arc<dyn EntityStore>,
    generator: Arc<dyn TextGenerator>,
    normalizer: DocumentNormalizer,
    reducer: Arc<dyn AnalysisReducer>,
}

impl AiTools {
    pub fn new(
        store: Arc<dyn EntityStore>,
        generator: Arc<dyn TextGenerator>,
        normalizer: DocumentNormalizer,
        reducer: Arc<dyn AnalysisReducer>,
    ) -> Self {
        Self {
            store,
            generator,
            normalizer,
            reducer,
        }
    }

    pub fn generation_configured(&self) -> bool {
        self.generator.is_configured()
    }

    pub async fn run(&self, request: TaskRequest) -> Result<TaskResponse, AppError> {
        let kind = request.kind();
        info!("{} started", kind.label());

        let response = match request {
            TaskRequest::AnalyzeCv(task) => self.analyze_cv(task).await.map(TaskResponse::AnalyzeCv),
            TaskRequest::GenerateJobDescription(task) => self
                .generate_job_description(task)
                .await
                .map(TaskResponse::JobDescription),
            TaskRequest::GenerateInterviewQuestions(task) => self
                .generate_interview_questions(task)
                .await
                .map(TaskResponse::InterviewQuestions),
            TaskRequest::GenerateEmail(task) => {
                self.generate_email(task).await.map(TaskResponse::Email)
            }
            TaskRequest::MatchJobs(task) => self.match_jobs(task).await.map(TaskResponse::MatchJobs),
            TaskRequest::ProcessQuery(task) => {
                self.process_query(task).await.map(TaskResponse::Query)
            }
        };

        match &response {
            Ok(_) => info!("{} finished", kind.label()),
            Err(e) => warn!("{} failed: {e}", kind.label()),
        }
        response
    }

    async fn analyze_cv(&self, task: AnalyzeCvTask) -> Result<AnalyzeCvResponse, AppError> {
        // An uploaded file wins over any text fields.
        let content = match &task.document {
            Some(doc) => Some(self.normalizer.normalize(doc).await?.text),
            None => task.text,
        };
        let content = content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                AppError::Validation(
                    "CV text, file content, or file upload is required".to_string(),
                )
            })?;

        let prompt = build_cv_analysis_prompt(&content);
        let raw_analysis = self.generate(TaskKind::AnalyzeCv, &prompt).await?;
        let analysis = self.reducer.reduce(&raw_analysis);

        Ok(AnalyzeCvResponse {
            analysis,
            raw_analysis,
        })
    }

    async fn generate_job_description(
        &self,
        task: JobDescriptionTask,
    ) -> Result<JobDescriptionResponse, AppError> {
        let prompt = build_job_description_prompt(&task);
        let job_description = self
            .generate(TaskKind::GenerateJobDescription, &prompt)
            .await?;
        Ok(JobDescriptionResponse { job_description })
    }

    async fn generate_interview_questions(
        &self,
        task: InterviewQuestionsTask,
    ) -> Result<InterviewQuestionsResponse, AppError> {
        let candidate = self.resolve_candidate(task.candidate_id.as_deref()).await?;
        let prompt = build_interview_prompt(&task, candidate.as_ref());
        let interview_questions = self
            .generate(TaskKind::GenerateInterviewQuestions, &prompt)
            .await?;
        Ok(InterviewQuestionsResponse {
            interview_questions,
        })
    }

    async fn generate_email(&self, task: EmailTask) -> Result<EmailResponse, AppError> {
        let (candidate, company) = match &task.recipient {
            Some((RecipientType::Candidate, id)) => {
                (self.resolve_candidate(Some(id.as_str())).await?, None)
            }
            Some((RecipientType::Company, id)) => (None, self.resolve_company(id).await?),
            None => (None, None),
        };
        let recipient = candidate
            .as_ref()
            .map(Recipient::Candidate)
            .or(company.as_ref().map(Recipient::Company));

        let prompt = build_email_prompt(&task, recipient);
        let email_template = self.generate(TaskKind::GenerateEmail, &prompt).await?;
        Ok(EmailResponse { email_template })
    }

    async fn match_jobs(&self, task: MatchJobsTask) -> Result<MatchJobsResponse, AppError> {
        let candidate = self.resolve_candidate(task.candidate_id.as_deref()).await?;
        // A resolved candidate replaces any supplied analysis.
        let profile = candidate
            .as_ref()
            .map(candidate_profile)
            .or(task.cv_analysis)
            .unwrap_or(Value::Null);

        let jobs = self.store.active_jobs(MAX_MATCH_JOBS).await?;
        let total_jobs_analyzed = jobs.len().min(MAX_MATCH_JOBS);
        info!("Matching candidate against {total_jobs_analyzed} active jobs");

        let prompt = build_match_jobs_prompt(&profile, &jobs);
        let job_matches = self.generate(TaskKind::MatchJobs, &prompt).await?;
        Ok(MatchJobsResponse {
            job_matches,
            total_jobs_analyzed,
        })
    }

    async fn process_query(&self, task: QueryTask) -> Result<QueryResponse, AppError> {
        let prompt = build_query_prompt(&task);
        let response = self.generate(TaskKind::ProcessQuery, &prompt).await?;
        Ok(QueryResponse { response })
    }

    async fn resolve_candidate(&self, id: Option<&str>) -> Result<Option<CandidateRow>, AppError> {
        let Some(id) = id else {
            return Ok(None);
        };
        let candidate = self.store.find_candidate(id).await?;
        if candidate.is_none() {
            warn!("Candidate {id} not found; continuing without candidate context");
        }
        Ok(candidate)
    }

    async fn resolve_company(&self, id: &str) -> Result<Option<CompanyRow>, AppError> {
        let company = self.store.find_company(id).await?;
        if company.is_none() {
            warn!("Company {id} not found; continuing without company context");
        }
        Ok(company)
    }

    async fn generate(&self, kind: TaskKind, prompt: &PromptPair) -> Result<String, AppError> {
        self.generator
            .generate(prompt, kind.sampling())
            .await
            .map_err(|e| match e {
                LlmError::MissingApiKey => {
                    AppError::Configuration(LlmError::MissingApiKey.to_string())
                }
                other => AppError::Generation(format!("{} failed: {other}", kind.label())),
            })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai_tools::models::{
        AnalyzeCvRequest, EmailRequest, InterviewQuestionsRequest, JobDescriptionRequest,
    };
    use crate::ai_tools::testing::{
        candidate, company, job, tools, tools_with_store, EchoGenerator, FailingGenerator,
    };
    use std::sync::atomic::Ordering;
    use crate::documents::{UploadedDocument, MIME_DOCX, MIME_TEXT};
    use crate::store::memory::MemoryStore;
    use bytes::Bytes;
    use serde_json::json;

    fn analyze(cv_text: Option<&str>, document: Option<UploadedDocument>) -> TaskRequest {
        TaskRequest::AnalyzeCv(AnalyzeCvTask::new(
            AnalyzeCvRequest {
                cv_text: cv_text.map(String::from),
                file_content: None,
            },
            document,
        ))
    }

    fn text_file(body: &'static str, mime_type: &str) -> UploadedDocument {
        UploadedDocument {
            bytes: Bytes::from_static(body.as_bytes()),
            mime_type: mime_type.to_string(),
            filename: "cv.txt".to_string(),
        }
    }

    #[tokio::test]
    async fn test_analyze_cv_echo_scenario() {
        let generator = Arc::new(EchoGenerator::default());
        let tools = tools(MemoryStore::default(), generator.clone());

        let response = tools
            .run(analyze(Some("Name: A B\n\nSkills: Go, Rust"), None))
            .await
            .unwrap();

        let TaskResponse::AnalyzeCv(out) = response else {
            panic!("expected CV analysis response");
        };
        assert_eq!(out.analysis.name, "A B");
        assert_eq!(out.analysis.skills, vec!["Go", "Rust"]);
        assert!(out.raw_analysis.contains("Name: A B"));

        let (_, params) = generator.last_call();
        assert!((params.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(params.max_output_tokens, 1500);
    }

    #[tokio::test]
    async fn test_analyze_cv_without_content_is_rejected_before_generation() {
        let generator = Arc::new(EchoGenerator::default());
        let tools = tools(MemoryStore::default(), generator.clone());

        let err = tools.run(analyze(Some("   "), None)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_uploaded_file_takes_precedence_over_text() {
        let generator = Arc::new(EchoGenerator::default());
        let tools = tools(MemoryStore::default(), generator.clone());

        let doc = text_file("Name: From File", MIME_TEXT);
        let response = tools
            .run(analyze(Some("Name: From Text"), Some(doc)))
            .await
            .unwrap();

        let TaskResponse::AnalyzeCv(out) = response else {
            panic!("expected CV analysis response");
        };
        assert_eq!(out.analysis.name, "From File");
    }

    #[tokio::test]
    async fn test_docx_upload_fails_without_generation() {
        let generator = Arc::new(EchoGenerator::default());
        let tools = tools(MemoryStore::default(), generator.clone());

        let err = tools
            .run(analyze(None, Some(text_file("PK", MIME_DOCX))))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_upload_is_a_validation_error() {
        let generator = Arc::new(EchoGenerator::default());
        let tools = tools(MemoryStore::default(), generator.clone());

        let err = tools
            .run(analyze(Some("Name: ignored"), Some(text_file("", MIME_TEXT))))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_email_with_only_purpose_uses_defaults() {
        let generator = Arc::new(EchoGenerator::default());
        let tools = tools(MemoryStore::default(), generator.clone());

        let task = EmailTask::try_from(EmailRequest {
            email_purpose: Some("offer".to_string()),
            ..Default::default()
        })
        .unwrap();
        tools.run(TaskRequest::GenerateEmail(task)).await.unwrap();

        let (prompt, params) = generator.last_call();
        assert!(prompt.user_content.contains("Tone: Professional and friendly"));
        assert!(prompt.user_content.contains("Sender: Hiring Manager"));
        assert!((params.temperature - 0.5).abs() < f32::EPSILON);
        assert_eq!(params.max_output_tokens, 800);
    }

    #[tokio::test]
    async fn test_email_resolves_company_recipient() {
        let mut store = MemoryStore::default();
        store.companies.insert("co-1".to_string(), company("Acme", Some("Retail")));
        let generator = Arc::new(EchoGenerator::default());
        let tools = tools(store, generator.clone());

        let task = EmailTask::try_from(EmailRequest {
            email_purpose: Some("partnership".to_string()),
            recipient_type: Some("company".to_string()),
            recipient_id: Some("co-1".to_string()),
            ..Default::default()
        })
        .unwrap();
        tools.run(TaskRequest::GenerateEmail(task)).await.unwrap();

        let (prompt, _) = generator.last_call();
        assert!(prompt.user_content.contains("Recipient: Acme (Retail industry)"));
    }

    #[tokio::test]
    async fn test_missing_candidate_is_not_an_error() {
        let generator = Arc::new(EchoGenerator::default());
        let tools = tools(MemoryStore::default(), generator.clone());

        let task = InterviewQuestionsTask::from(InterviewQuestionsRequest {
            candidate_id: Some("ghost".to_string()),
            ..Default::default()
        });
        let response = tools
            .run(TaskRequest::GenerateInterviewQuestions(task))
            .await
            .unwrap();

        assert!(matches!(response, TaskResponse::InterviewQuestions(_)));
        let (prompt, _) = generator.last_call();
        assert!(!prompt.user_content.contains("Candidate:"));
    }

    #[tokio::test]
    async fn test_interview_includes_resolved_candidate() {
        let mut store = MemoryStore::default();
        store.candidates.insert("c-1".to_string(), candidate("Grace", "Hopper"));
        let store = Arc::new(store);
        let generator = Arc::new(EchoGenerator::default());
        let tools = tools_with_store(store.clone(), generator.clone());

        let task = InterviewQuestionsTask::from(InterviewQuestionsRequest {
            candidate_id: Some("c-1".to_string()),
            ..Default::default()
        });
        tools
            .run(TaskRequest::GenerateInterviewQuestions(task))
            .await
            .unwrap();

        let (prompt, params) = generator.last_call();
        assert!(prompt.user_content.contains("Candidate: Grace Hopper"));
        assert_eq!(params.max_output_tokens, 1200);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_outage_propagates() {
        let store = MemoryStore {
            unavailable: true,
            ..Default::default()
        };
        let generator = Arc::new(EchoGenerator::default());
        let tools = tools(store, generator.clone());

        let task = InterviewQuestionsTask::from(InterviewQuestionsRequest {
            candidate_id: Some("c-1".to_string()),
            ..Default::default()
        });
        let err = tools
            .run(TaskRequest::GenerateInterviewQuestions(task))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_match_jobs_caps_at_twenty_and_falls_back_to_analysis() {
        let mut store = MemoryStore::default();
        store.jobs = (1..=25).map(|n| job(n, "active")).collect();
        let generator = Arc::new(EchoGenerator::default());
        let tools = tools(store, generator.clone());

        let task = MatchJobsTask::try_from(crate::ai_tools::models::MatchJobsRequest {
            candidate_id: Some("unknown".to_string()),
            cv_analysis: Some(json!({ "name": "Fallback Person" })),
        })
        .unwrap();
        let response = tools.run(TaskRequest::MatchJobs(task)).await.unwrap();

        let TaskResponse::MatchJobs(out) = response else {
            panic!("expected match response");
        };
        assert_eq!(out.total_jobs_analyzed, 20);
        let (prompt, _) = generator.last_call();
        assert!(prompt.user_content.contains("Fallback Person"));
        assert!(prompt.user_content.contains("\n20. Role 20 at"));
        assert!(!prompt.user_content.contains("Role 21"));
    }

    #[tokio::test]
    async fn test_match_jobs_prefers_resolved_candidate() {
        let mut store = MemoryStore::default();
        store.candidates.insert("c-1".to_string(), candidate("Ada", "Lovelace"));
        store.jobs = vec![job(1, "active"), job(2, "closed")];
        let store = Arc::new(store);
        let generator = Arc::new(EchoGenerator::default());
        let tools = tools_with_store(store.clone(), generator.clone());

        let task = MatchJobsTask::try_from(crate::ai_tools::models::MatchJobsRequest {
            candidate_id: Some("c-1".to_string()),
            cv_analysis: Some(json!({ "name": "Ignored" })),
        })
        .unwrap();
        let response = tools.run(TaskRequest::MatchJobs(task)).await.unwrap();

        let TaskResponse::MatchJobs(out) = response else {
            panic!("expected match response");
        };
        assert_eq!(out.total_jobs_analyzed, 1);
        let (prompt, _) = generator.last_call();
        assert!(prompt.user_content.contains("Ada Lovelace"));
        assert!(!prompt.user_content.contains("Ignored"));
        // One candidate fetch plus one job listing.
        assert_eq!(store.lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_generation_failure_carries_task_context() {
        let tools = tools(MemoryStore::default(), Arc::new(FailingGenerator));

        let task = JobDescriptionTask::try_from(JobDescriptionRequest {
            position: Some("SRE".to_string()),
            ..Default::default()
        })
        .unwrap();
        let err = tools
            .run(TaskRequest::GenerateJobDescription(task))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Generation(_)));
        assert!(err.to_string().starts_with("Job description generation failed"));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_configuration_error() {
        let tools = tools(
            MemoryStore::default(),
            Arc::new(crate::llm_client::LazyLlmClient::new(None)),
        );
        assert!(!tools.generation_configured());

        let task = QueryTask {
            query: "hello".to_string(),
            context: None,
        };
        let err = tools.run(TaskRequest::ProcessQuery(task)).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
