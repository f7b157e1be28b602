//! Language model backends.
//!
//! Personas talk through a [`LanguageModel`]; the model name comes from the persona so
//! different guests can run on different models.

mod ollama;
mod openai;

pub use ollama::OllamaClient;
pub use openai::OpenAiModel;

use crate::config::{LlmProvider, Settings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Trait for text generation.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for a single prompt.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;

    /// Backend name for diagnostics.
    fn name(&self) -> &str;
}

/// Build the backend selected in the settings.
pub fn create_model(settings: &Settings) -> Result<Arc<dyn LanguageModel>> {
    let timeout = Duration::from_secs(settings.llm.timeout_seconds);
    let model: Arc<dyn LanguageModel> = match settings.llm.provider {
        LlmProvider::Ollama => Arc::new(OllamaClient::new(&settings.llm.base_url, timeout)?),
        LlmProvider::OpenAI => Arc::new(OpenAiModel::new(timeout)?),
    };
    Ok(model)
}
