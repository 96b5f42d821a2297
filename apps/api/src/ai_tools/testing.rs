//! Stubs and fixtures shared by the orchestrator and router tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::ai_tools::orchestrator::AiTools;
use crate::ai_tools::reducer::KeywordSectionReducer;
use crate::documents::pdf::PdfExtractBackend;
use crate::documents::DocumentNormalizer;
use crate::llm_client::{LlmError, PromptPair, SamplingParams, TextGenerator};
use crate::models::candidate::CandidateRow;
use crate::models::company::CompanyRow;
use crate::models::job::JobRow;
use crate::store::memory::MemoryStore;

/// Answers every prompt with its own user content and records the call.
#[derive(Default)]
pub struct EchoGenerator {
    calls: Mutex<Vec<(PromptPair, SamplingParams)>>,
}

impl EchoGenerator {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> (PromptPair, SamplingParams) {
        self.calls
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("generator was never called")
    }
}

#[async_trait]
impl TextGenerator for EchoGenerator {
    async fn generate(
        &self,
        prompt: &PromptPair,
        params: SamplingParams,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push((prompt.clone(), params));
        Ok(prompt.user_content.clone())
    }
}

pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(
        &self,
        _prompt: &PromptPair,
        _params: SamplingParams,
    ) -> Result<String, LlmError> {
        Err(LlmError::Api {
            status: 529,
            message: "Overloaded".to_string(),
        })
    }
}

pub fn tools(store: MemoryStore, generator: Arc<dyn TextGenerator>) -> AiTools {
    tools_with_store(Arc::new(store), generator)
}

/// Like `tools`, but the caller keeps a handle on the store to inspect lookups.
pub fn tools_with_store(store: Arc<MemoryStore>, generator: Arc<dyn TextGenerator>) -> AiTools {
    AiTools::new(
        store,
        generator,
        DocumentNormalizer::new(Arc::new(PdfExtractBackend)),
        Arc::new(KeywordSectionReducer),
    )
}

pub fn candidate(first_name: &str, last_name: &str) -> CandidateRow {
    CandidateRow {
        id: Uuid::new_v4(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        position: Some("Software Engineer".to_string()),
        skills: vec!["Rust".to_string(), "Kubernetes".to_string()],
        experience: Some(json!([{ "company": "Initech", "years": 4 }])),
        education: Some(json!([{ "degree": "BSc Computer Science" }])),
        created_at: Utc::now(),
    }
}

pub fn company(name: &str, industry: Option<&str>) -> CompanyRow {
    CompanyRow {
        id: Uuid::new_v4(),
        name: name.to_string(),
        industry: industry.map(String::from),
        created_at: Utc::now(),
    }
}

pub fn job(n: usize, status: &str) -> JobRow {
    JobRow {
        id: Uuid::new_v4(),
        title: format!("Role {n}"),
        company: format!("Company {n}"),
        requirements: Some("3+ years backend experience".to_string()),
        description: Some(format!("Description for role {n}. ").repeat(20)),
        status: status.to_string(),
        created_at: Utc::now(),
    }
}
