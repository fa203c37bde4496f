//! Generation service client.
//!
//! The one hard dependency of the chat path: everything before it degrades,
//! but a failure here is reported to the caller, preserving the upstream
//! status code when there is one.

use crate::types::{AppError, Result};
use serde_json::json;

pub struct GenerationClient {
    http: reqwest::Client,
    base_url: String,
}

impl GenerationClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Open a streaming generation call and hand back the raw response.
    ///
    /// No read deadline is applied: answer length is unbounded, so the
    /// stream stays open until the model reports done or the caller drops
    /// the response.
    pub async fn stream(&self, model: &str, prompt: &str) -> Result<reqwest::Response> {
        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&json!({"model": model, "prompt": prompt, "stream": true}))
            .send()
            .await
            .map_err(|e| AppError::Generation {
                message: format!("Generation request failed: {}", e),
                status: e.status().map(|s| s.as_u16()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Generation {
                message: format!("Generation service returned {}: {}", status, body),
                status: Some(status.as_u16()),
            });
        }

        Ok(response)
    }
}
