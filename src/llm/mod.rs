//! Chat completion client for OpenAI-compatible endpoints (Groq by default).


use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::LlmConfig;
use crate::http::{DEFAULT_RETRY_ATTEMPTS, build_agent, request_with_retry};
use crate::{InspectorError, Result};

/// Anything that turns a prompt into a completion
pub trait LanguageModel: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    endpoint: Url,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    agent: ureq::Agent,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatClient {
    /// Create a client, reading the API key from the configured variable
    #[inline]
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let endpoint = config
            .chat_completions_url()
            .map_err(|e| InspectorError::Config(e.to_string()))?;

        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(Self {
            endpoint,
            model: config.model.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
            agent: build_agent(Duration::from_secs(config.timeout_seconds)),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        })
    }

    #[inline]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    #[inline]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn complete(&self, api_key: &str, prompt: &str) -> anyhow::Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let request_json =
            serde_json::to_string(&request).context("Failed to serialize chat request")?;
        let authorization = format!("Bearer {api_key}");

        debug!(
            "Requesting completion from {} with model {} (prompt length: {})",
            self.endpoint,
            self.model,
            prompt.len()
        );

        let response_text = request_with_retry(self.retry_attempts, self.endpoint.as_str(), || {
            self.agent
                .post(self.endpoint.as_str())
                .header("Content-Type", "application/json")
                .header("Authorization", &authorization)
                .send(&request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
        .context("Chat completion request failed")?;

        let response: ChatResponse =
            serde_json::from_str(&response_text).context("Failed to parse chat response")?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Chat response contained no message content")?;

        Ok(content.trim().to_string())
    }
}

impl LanguageModel for ChatClient {
    #[inline]
    fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            InspectorError::Llm(format!(
                "API key not found: set the {} environment variable",
                self.api_key_env
            ))
        })?;

        self.complete(api_key, prompt)
            .map_err(|e| InspectorError::Llm(format!("{e:#}")))
    }
}
