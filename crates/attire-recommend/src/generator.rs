//! Hosted-model generation boundary.
//!
//! The model is an opaque capability: text in, text out. The production
//! implementation posts a single-turn chat request to a hosted
//! chat-completions endpoint with an explicit timeout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::RecommendError;

const HOSTED_API_URL: &str = "https://router.huggingface.co/v1/chat/completions";

/// Opaque generation capability, mockable in tests.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, RecommendError>;
}

/// Chat-completions client for a hosted model.
#[derive(Debug, Clone)]
pub struct HostedModel {
    client: reqwest::Client,
    api_url: String,
    model: String,
    api_key: String,
    max_new_tokens: u32,
}

impl HostedModel {
    /// Build a client. The access token is passed in explicitly; nothing is
    /// read from the process environment.
    pub fn new(
        api_key: &str,
        model: &str,
        max_new_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, RecommendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RecommendError::Generation(e.to_string()))?;

        Ok(Self {
            client,
            api_url: HOSTED_API_URL.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            max_new_tokens,
        })
    }

    /// Point the client at a different endpoint (tests, self-hosted router).
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.to_string();
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[async_trait]
impl Generator for HostedModel {
    async fn generate(&self, prompt: &str) -> Result<String, RecommendError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_new_tokens,
        };

        tracing::debug!(model = %self.model, "requesting recommendation");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RecommendError::Generation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecommendError::Generation(format!(
                "model endpoint returned {status}: {body}"
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| RecommendError::Generation(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| RecommendError::Generation("model returned no choices".to_string()))
    }
}
