//! OpenAI chat-completions backend.

use super::LanguageModel;
use crate::error::{PodcastError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client))
}

/// Persona backend using OpenAI chat completions.
pub struct OpenAiModel {
    client: Client<OpenAIConfig>,
}

impl OpenAiModel {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client_with_timeout(timeout)?,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    #[instrument(skip(self, prompt), fields(model = %model))]
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(|e| PodcastError::Llm(e.to_string()))?
                .into()])
            .temperature(0.8)
            .build()
            .map_err(|e| PodcastError::Llm(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PodcastError::OpenAI(format!("Chat completion failed: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| PodcastError::Llm("Empty response from model".to_string()))?;

        debug!("Received {} characters", content.len());
        Ok(content.trim().to_string())
    }

    fn name(&self) -> &str {
        "openai"
    }
}
