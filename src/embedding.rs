//! OpenAI-compatible embedding client.
//!
//! Same wire idiom as the chat client: bearer auth against a `/v1` route,
//! typed request/response bodies, API errors decoded into our error type.

use crate::config::EmbeddingConfig;
use crate::error::{RagEvalError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// The embedding collaborator the Answer Relevancy driver talks to.
///
/// `embed_batch` must return one vector per input text, in input order.
#[async_trait]
pub trait TextEmbedding: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Request body for the embeddings endpoint.
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// Response from the embeddings endpoint.
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingObject>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingObject {
    embedding: Vec<f32>,
    index: usize,
}

/// OpenAI-compatible embedding API error response.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// OpenAI-compatible embedding client.
#[derive(Clone)]
pub struct EmbeddingClient {
    client: Client,
    config: EmbeddingConfig,
}

impl EmbeddingClient {
    /// Create a new embedding client with the given configuration.
    pub fn new(config: EmbeddingConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Get the API endpoint URL.
    fn endpoint(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{}/v1/embeddings", base)
    }

    async fn request(&self, input: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&body) {
                return Err(RagEvalError::EmbeddingApi(format!(
                    "API error ({}): {}",
                    status, api_error.error.message
                )));
            }
            return Err(RagEvalError::EmbeddingApi(format!(
                "Request failed ({}): {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = serde_json::from_str(&body)?;

        if parsed.data.len() != input.len() {
            return Err(RagEvalError::EmbeddingApi(format!(
                "Expected {} embeddings, got {}",
                input.len(),
                parsed.data.len()
            )));
        }

        // The API reports an index per vector; sort by it rather than
        // trusting response order.
        let mut data = parsed.data;
        data.sort_by_key(|obj| obj.index);

        Ok(data.into_iter().map(|obj| obj.embedding).collect())
    }
}

#[async_trait]
impl TextEmbedding for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = [text.to_string()];
        let mut vectors = self.request(&input).await?;
        Ok(vectors.remove(0))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }
}
