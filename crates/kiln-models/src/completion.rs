//! OpenAI-compatible chat completion client.
//!
//! Used for the advisory analysis step; the endpoint is any service that
//! speaks the `/chat/completions` wire format.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("completion API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("no content in completion response")]
    MissingContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

/// Minimal chat-completion client.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl CompletionClient {
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { api_key: api_key.into(), base_url, client: Client::new() }
    }

    /// Sends one chat completion request and returns the first choice's
    /// content.
    pub async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: Option<f32>,
    ) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %model, message_count = messages.len(), "Requesting chat completion");

        let body = CompletionRequest { model, messages, temperature };
        let response =
            self.client.post(&url).bearer_auth(&self.api_key).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, "Completion API returned error status");
            return Err(CompletionError::Api { status: status.as_u16(), message });
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CompletionError::MissingContent)
    }
}
