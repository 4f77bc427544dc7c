//! OpenAI-compatible chat completions client used for extraction and translation.

pub mod extract;
pub mod translate;

use crate::config::AiConfig;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum AiError {
  #[error("AI is not configured")]
  NotConfigured,

  #[error("AI request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("AI endpoint returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("AI returned empty response")]
  EmptyResponse,

  #[error("AI returned malformed output: {0}")]
  Malformed(String),
}

#[derive(Deserialize)]
struct ChatResponse {
  choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
  message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
  content: Option<String>,
}

/// Thin client over `{base_url}/chat/completions`.
#[derive(Debug, Clone)]
pub struct ChatClient {
  http: reqwest::Client,
  endpoint: String,
  api_key: Option<String>,
  model: String,
}

impl ChatClient {
  pub fn new(config: &AiConfig) -> Result<Self, AiError> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(60))
      .build()?;
    Ok(ChatClient {
      http,
      endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
      api_key: config.api_key.clone(),
      model: config.model.clone(),
    })
  }

  pub fn is_configured(&self) -> bool {
    self.api_key.is_some()
  }

  /// Send one system + user exchange and return the assistant text.
  pub async fn complete(&self, system_prompt: &str, user_content: &str) -> Result<String, AiError> {
    let api_key = self.api_key.as_deref().ok_or(AiError::NotConfigured)?;
    let body = serde_json::json!({
      "model": self.model,
      "messages": [
        { "role": "system", "content": system_prompt },
        { "role": "user", "content": user_content }
      ],
      "stream": false
    });
    debug!(endpoint = %self.endpoint, model = %self.model, "chat completion");

    let resp = self
      .http
      .post(&self.endpoint)
      .bearer_auth(api_key)
      .json(&body)
      .send()
      .await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(AiError::Status {
        status: status.as_u16(),
        body,
      });
    }

    let parsed: ChatResponse = resp.json().await?;
    parsed
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .filter(|c| !c.trim().is_empty())
      .ok_or(AiError::EmptyResponse)
  }
}
