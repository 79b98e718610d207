use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::app::ports::ChatCompletionPort;
use crate::config::OpenRouterConfig;
use crate::error::{BotError, Result};
use crate::types::ChatMessage;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenRouter (OpenAI-compatible) chat-completions client
#[derive(Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenRouterClient {
    pub fn new(config: &OpenRouterConfig) -> Result<Self> {
        if !config.api_key_configured() {
            return Err(BotError::Config(
                "OPENROUTER_API_KEY is missing or still a placeholder".to_string(),
            ));
        }
        let api_key = config.api_key.clone().unwrap_or_default();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatCompletionPort for OpenRouterClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, messages = messages.len(), "Sending chat completion");
        let resp = self
            .client
            .post(&self.api_url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(BotError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| BotError::MissingField("choices[0].message.content".to_string()))
    }
}
