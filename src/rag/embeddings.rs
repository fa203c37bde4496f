use crate::types::{AppError, Result};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const EMBED_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Option<Vec<f32>>,
}

/// Client for the embedding endpoint of the model service.
///
/// Every failure mode (non-2xx, transport error, missing vector in the
/// body) comes back as [`AppError::Embedding`]; callers treat it as a
/// per-item failure, never as pipeline-fatal.
pub struct EmbeddingClient {
    http: reqwest::Client,
    base_url: String,
}

impl EmbeddingClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let response = self
            .http
            .post(format!("{}/api/embeddings", self.base_url))
            .timeout(EMBED_TIMEOUT)
            .json(&json!({"model": model, "prompt": text}))
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Embedding(format!(
                "Embedding service returned {}",
                response.status()
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Malformed embedding response: {}", e)))?;

        body.embedding
            .ok_or_else(|| AppError::Embedding("Response missing embedding field".to_string()))
    }
}
