//! Ollama client for local inference.

use super::LanguageModel;
use crate::error::{PodcastError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

/// HTTP client for an Ollama server.
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a client for the server at `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the server is reachable.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(3))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// List models installed on the server.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(PodcastError::Llm(format!(
                "Ollama returned status {} listing models",
                resp.status()
            )));
        }
        let tags: TagsResponse = resp.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    #[instrument(skip(self, prompt), fields(model = %model))]
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        debug!("Calling model {}", model);
        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PodcastError::Llm(format!(
                "Ollama API returned status {}: {}",
                status, body
            )));
        }

        let data: GenerateResponse = response.json().await?;
        debug!("Model call for {} successful", model);
        Ok(data.response.trim().to_string())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_generate_returns_trimmed_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/generate")
                    .json_body(json!({"model": "llama3:8b", "prompt": "Hi", "stream": false}));
                then.status(200)
                    .json_body(json!({"response": "  Hello there!\n", "done": true}));
            })
            .await;

        let client = OllamaClient::new(&server.base_url(), Duration::from_secs(5)).unwrap();
        let reply = client.generate("llama3:8b", "Hi").await.unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "Hello there!");
    }

    #[tokio::test]
    async fn test_generate_surfaces_http_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(404).body("model not found");
            })
            .await;

        let client = OllamaClient::new(&server.base_url(), Duration::from_secs(5)).unwrap();
        let err = client.generate("missing", "Hi").await.unwrap_err();

        match err {
            PodcastError::Llm(msg) => {
                assert!(msg.contains("404"));
                assert!(msg.contains("model not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_list_models_and_availability() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tags");
                then.status(200)
                    .json_body(json!({"models": [{"name": "llama3:8b"}, {"name": "mistral:latest"}]}));
            })
            .await;

        let client = OllamaClient::new(&format!("{}/", server.base_url()), Duration::from_secs(5)).unwrap();
        assert!(client.is_available().await);
        let models = client.list_models().await.unwrap();
        assert_eq!(models, vec!["llama3:8b", "mistral:latest"]);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let client = OllamaClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert!(!client.is_available().await);
    }
}
