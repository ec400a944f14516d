//! OpenAI-compatible HTTP gateway implementations
//!
//! Both gateways share the same transport treatment: a bounded request
//! timeout, bearer auth read from a configured environment variable, and
//! exponential backoff retry on 429/5xx/network errors. Other 4xx responses
//! fail immediately.

use super::{ChatTurn, CompletionModel, Embedder};
use crate::config::{CompletionConfig, EmbeddingConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Embedding gateway backed by an OpenAI-compatible `/embeddings` endpoint
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
    max_retries: usize,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    /// Create an embedding gateway from configuration
    ///
    /// Reads the API key from the environment variable named in the config.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = config.api_key()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            dimension: config.dimension,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding {} texts with {}", texts.len(), self.model);

        let url = format!("{}/embeddings", self.base_url);
        let body = EmbeddingsRequest {
            model: &self.model,
            input: texts,
        };

        let json = request_with_retry(
            &self.client,
            &url,
            &self.api_key,
            &serde_json::to_value(&body)?,
            self.max_retries,
        )
        .await
        .map_err(Error::EmbeddingService)?;

        let response: EmbeddingsResponse = serde_json::from_value(json)
            .map_err(|e| Error::EmbeddingService(format!("malformed response: {}", e)))?;

        if response.data.len() != texts.len() {
            return Err(Error::EmbeddingService(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.data.len()
            )));
        }

        // The API may return entries out of order; restore input order
        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        let mut vectors = Vec::with_capacity(data.len());
        for item in data {
            if item.embedding.len() != self.dimension {
                return Err(Error::DimensionMismatch {
                    expected: self.dimension,
                    actual: item.embedding.len(),
                });
            }
            vectors.push(item.embedding);
        }

        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Completion gateway backed by an OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiCompletion {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: usize,
}

#[derive(Serialize)]
struct CompletionsRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionsResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

impl OpenAiCompletion {
    /// Create a completion gateway from configuration
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = config.api_key()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl CompletionModel for OpenAiCompletion {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String> {
        debug!("Requesting completion from {}", self.model);

        let url = format!("{}/chat/completions", self.base_url);
        let body = CompletionsRequest {
            model: &self.model,
            messages: turns,
            temperature: self.temperature,
        };

        let json = request_with_retry(
            &self.client,
            &url,
            &self.api_key,
            &serde_json::to_value(&body)?,
            self.max_retries,
        )
        .await
        .map_err(Error::CompletionService)?;

        let response: CompletionsResponse = serde_json::from_value(json)
            .map_err(|e| Error::CompletionService(format!("malformed response: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::CompletionService("response contained no choices".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// POST a JSON body with exponential backoff on transient failures
///
/// Retries 429 and 5xx responses and network errors; other client errors
/// fail immediately. Backoff: 1s, 2s, 4s, ... capped at 32s.
async fn request_with_retry(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    body: &serde_json::Value,
    max_retries: usize,
) -> std::result::Result<serde_json::Value, String> {
    let mut last_err = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            warn!("Retrying {} after {:?} (attempt {})", url, delay, attempt + 1);
            tokio::time::sleep(delay).await;
        }

        let resp = client
            .post(url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await;

        match resp {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return response
                        .json::<serde_json::Value>()
                        .await
                        .map_err(|e| format!("invalid JSON from {}: {}", url, e));
                }

                let body_text = response.text().await.unwrap_or_default();

                if status.as_u16() == 429 || status.is_server_error() {
                    last_err = Some(format!("HTTP {} from {}: {}", status, url, body_text));
                    continue;
                }

                return Err(format!("HTTP {} from {}: {}", status, url, body_text));
            }
            Err(e) => {
                last_err = Some(format!("request to {} failed: {}", url, e));
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| format!("request to {} failed after retries", url)))
}
