/// LLM Client — the single point of entry for all model calls in SiteForge.
///
/// ARCHITECTURAL RULE: No other module may call the OpenRouter API directly.
/// All LLM interactions MUST go through this module.
///
/// Model: kwaipilot/kat-coder-pro:free (hardcoded — do not make configurable
/// to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
/// The model used for all LLM calls in SiteForge.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "kwaipilot/kat-coder-pro:free";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Extracts the assistant text from the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// The generation operations the project workflows depend on.
///
/// Handlers hold this as a trait object so the OpenRouter transport can be
/// swapped out in tests without touching the orchestration code.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Expands a raw project brief into a detailed build prompt.
    async fn expand_initial_prompt(&self, brief: &str) -> Result<String, LlmError>;

    /// Rewrites a free-form change request into precise edit instructions.
    async fn enhance_revision(&self, message: &str) -> Result<String, LlmError>;

    /// Generates a complete website from an expanded prompt.
    async fn generate_site(&self, expanded_prompt: &str) -> Result<String, LlmError>;

    /// Applies edit instructions to an existing document, returning the full
    /// updated document.
    async fn revise_site(&self, current_code: &str, instructions: &str)
        -> Result<String, LlmError>;
}

/// The single LLM client used by all services in SiteForge.
/// Wraps the OpenRouter chat completions API.
///
/// Calls are made without retries or a client-side deadline: each call is
/// paid for up front from user credits, and a duplicate request after an
/// ambiguous timeout would double-bill the user. Failures refund instead.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
}

impl OpenRouterClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    /// Makes a raw chat completion call, returning the assistant text.
    async fn chat(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(OPENROUTER_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse a structured error message
            let message = serde_json::from_str::<ProviderError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse = response.json().await?;

        let text = chat_response.text().ok_or(LlmError::EmptyContent)?;
        debug!("LLM call succeeded: {} chars returned", text.len());

        Ok(text.to_string())
    }
}

#[async_trait]
impl GenerativeBackend for OpenRouterClient {
    async fn expand_initial_prompt(&self, brief: &str) -> Result<String, LlmError> {
        self.chat(prompts::EXPAND_INITIAL_PROMPT_SYSTEM, brief).await
    }

    async fn enhance_revision(&self, message: &str) -> Result<String, LlmError> {
        let prompt = prompts::ENHANCE_REVISION_PROMPT_TEMPLATE.replace("{message}", message);
        self.chat(prompts::ENHANCE_REVISION_SYSTEM, &prompt).await
    }

    async fn generate_site(&self, expanded_prompt: &str) -> Result<String, LlmError> {
        self.chat(prompts::GENERATE_SITE_SYSTEM, expanded_prompt).await
    }

    async fn revise_site(
        &self,
        current_code: &str,
        instructions: &str,
    ) -> Result<String, LlmError> {
        let prompt = prompts::REVISE_SITE_PROMPT_TEMPLATE
            .replace("{current_code}", current_code)
            .replace("{instructions}", instructions);
        self.chat(prompts::REVISE_SITE_SYSTEM, &prompt).await
    }
}
