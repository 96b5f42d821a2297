//! LLM client: the single point of entry for all Claude API calls.
//!
//! ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
//! All generation goes through the `TextGenerator` trait defined here.
//!
//! Model: claude-sonnet-4-5, fixed for every task kind.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls.
pub const MODEL: &str = "claude-sonnet-4-5";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Generation service API key is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// The (system, user) message pair sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system_instruction: &'static str,
    pub user_content: String,
}

/// Sampling knobs fixed per task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// The generation capability. Implement this to swap the vendor (or stub it
/// in tests) without touching the orchestrator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &PromptPair, params: SamplingParams)
        -> Result<String, LlmError>;

    /// Whether a call could get past configuration. Used by the health probe.
    fn is_configured(&self) -> bool {
        true
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first non-blank text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .find(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Wraps the Anthropic Messages API. One call per `generate`; failures are
/// returned as-is, never retried here.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, api_key })
    }

    /// Makes a raw call to the Claude API, returning the full response object.
    pub async fn call(
        &self,
        prompt: &PromptPair,
        params: SamplingParams,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: params.max_output_tokens,
            temperature: params.temperature,
            system: prompt.system_instruction,
            messages: vec![AnthropicMessage {
                role: "user",
                content: &prompt.user_content,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(
        &self,
        prompt: &PromptPair,
        params: SamplingParams,
    ) -> Result<String, LlmError> {
        let response = self.call(prompt, params).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Process-wide handle that builds the `LlmClient` on first use.
///
/// A missing key fails every call with the same error; once built, the client
/// is shared read-only for the life of the process.
pub struct LazyLlmClient {
    api_key: Option<String>,
    cell: OnceCell<LlmClient>,
}

impl LazyLlmClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            cell: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&LlmClient, LlmError> {
        self.cell
            .get_or_try_init(|| async {
                let key = self.api_key.clone().ok_or(LlmError::MissingApiKey)?;
                let client = LlmClient::new(key)?;
                info!("LLM client initialized (model: {MODEL})");
                Ok(client)
            })
            .await
    }
}

#[async_trait]
impl TextGenerator for LazyLlmClient {
    async fn generate(
        &self,
        prompt: &PromptPair,
        params: SamplingParams,
    ) -> Result<String, LlmError> {
        self.client().await?.generate(prompt, params).await
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> PromptPair {
        PromptPair {
            system_instruction: "You are a test assistant.",
            user_content: "Say hi".to_string(),
        }
    }

    const PARAMS: SamplingParams = SamplingParams {
        temperature: 0.3,
        max_output_tokens: 100,
    };

    #[tokio::test]
    async fn test_lazy_client_without_key_fails_every_call() {
        let lazy = LazyLlmClient::new(None);
        assert!(!lazy.is_configured());

        for _ in 0..2 {
            let err = lazy.generate(&prompt(), PARAMS).await.unwrap_err();
            assert!(matches!(err, LlmError::MissingApiKey));
        }
        assert!(lazy.cell.get().is_none());
    }

    #[tokio::test]
    async fn test_lazy_client_builds_once() {
        let lazy = LazyLlmClient::new(Some("sk-test".to_string()));
        assert!(lazy.is_configured());

        let first = lazy.client().await.unwrap() as *const LlmClient;
        let second = lazy.client().await.unwrap() as *const LlmClient;
        assert_eq!(first, second);
    }

    #[test]
    fn test_request_body_carries_sampling_params() {
        let p = prompt();
        let body = AnthropicRequest {
            model: MODEL,
            max_tokens: PARAMS.max_output_tokens,
            temperature: PARAMS.temperature,
            system: p.system_instruction,
            messages: vec![AnthropicMessage {
                role: "user",
                content: &p.user_content,
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_tokens"], 100);
        assert_eq!(json["system"], "You are a test assistant.");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Say hi");
    }

    #[test]
    fn test_response_text_skips_blank_blocks() {
        let json = r#"{
            "content": [
                {"type": "text", "text": "   "},
                {"type": "text", "text": "Hello"}
            ],
            "usage": {"input_tokens": 3, "output_tokens": 1}
        }"#;
        let response: LlmResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), Some("Hello"));
    }

    #[test]
    fn test_response_without_text_is_none() {
        let json = r#"{"content": [], "usage": {"input_tokens": 3, "output_tokens": 0}}"#;
        let response: LlmResponse = serde_json::from_str(json).unwrap();
        assert!(response.text().is_none());
    }
}
