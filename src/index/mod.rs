//! Vector index client.
//!
//! Talks to the vector index service over its REST surface: existence
//! probes, collection creation, point upserts, nearest-neighbor search, and
//! best-effort point deletion. Collections are created lazily with cosine
//! distance and are never resized here; a width mismatch surfaces as an
//! upstream error on write.

use crate::types::{AppError, Result, SearchHit};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Existence probes are cheap; everything else gets the full budget.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// One vector plus its metadata, keyed by the buffered record's id.
#[derive(Debug, Clone, Serialize)]
pub struct VectorPoint {
    pub id: i64,
    pub vector: Vec<f32>,
    pub payload: Value,
}

/// REST client for a named vector index service.
///
/// Constructed per request from the current [`RuntimeConfig`] snapshot, over
/// a shared connection pool.
///
/// [`RuntimeConfig`]: crate::db::RuntimeConfig
pub struct VectorIndexClient {
    http: reqwest::Client,
    base_url: String,
}

impl VectorIndexClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn collection_exists(&self, name: &str) -> Result<bool> {
        let response = self
            .http
            .get(format!("{}/collections/{}", self.base_url, name))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Failed to probe collection: {}", e)))?;

        Ok(response.status().is_success())
    }

    /// Create the collection if it does not exist yet.
    ///
    /// The check-then-create is not atomic: two first writers may race on a
    /// brand-new name. The loser's create comes back "already exists", which
    /// is treated as success.
    pub async fn ensure_collection(&self, name: &str, vector_size: u64) -> Result<()> {
        if self.collection_exists(name).await? {
            return Ok(());
        }

        debug!(collection = name, vector_size, "creating vector collection");

        let response = self
            .http
            .put(format!("{}/collections/{}", self.base_url, name))
            .timeout(REQUEST_TIMEOUT)
            .json(&json!({
                "vectors": {"size": vector_size, "distance": "Cosine"}
            }))
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Failed to create collection: {}", e)))?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::CONFLICT {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(AppError::Search(format!(
                "Failed to create collection '{}': {} {}",
                name, status, body
            )))
        }
    }

    /// Overwrite-by-id batch upsert. Partial failure fails the whole batch.
    pub async fn upsert(&self, collection: &str, points: &[VectorPoint]) -> Result<usize> {
        let response = self
            .http
            .put(format!(
                "{}/collections/{}/points?wait=true",
                self.base_url, collection
            ))
            .timeout(REQUEST_TIMEOUT)
            .json(&json!({"points": points}))
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Failed to upsert points: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Search(format!(
                "Failed to upsert points into '{}': {} {}",
                collection, status, body
            )));
        }

        Ok(points.len())
    }

    /// Nearest-neighbor search. A missing collection yields an empty result
    /// set rather than an error, so search and chat degrade instead of
    /// failing hard.
    pub async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        if !self.collection_exists(collection).await? {
            return Ok(vec![]);
        }

        let response = self
            .http
            .post(format!(
                "{}/collections/{}/points/search",
                self.base_url, collection
            ))
            .timeout(REQUEST_TIMEOUT)
            .json(&json!({
                "vector": vector,
                "limit": limit,
                "with_payload": true
            }))
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Vector search failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Search(format!(
                "Vector search in '{}' failed: {} {}",
                collection, status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Malformed search response: {}", e)))?;

        Ok(parse_search_response(&body))
    }

    /// Remove points by id. Callers treat failure as best-effort; the buffer
    /// stays the source of truth.
    pub async fn delete_points(&self, collection: &str, ids: &[i64]) -> Result<()> {
        let response = self
            .http
            .post(format!(
                "{}/collections/{}/points/delete?wait=true",
                self.base_url, collection
            ))
            .timeout(REQUEST_TIMEOUT)
            .json(&json!({"points": ids}))
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Failed to delete points: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::Search(format!(
                "Failed to delete points from '{}': {}",
                collection, status
            )));
        }

        Ok(())
    }
}

/// Parse the `{"result": [{id, score, payload}]}` search body, dropping
/// hits that lack the expected fields.
fn parse_search_response(body: &Value) -> Vec<SearchHit> {
    body.get("result")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| {
                    Some(SearchHit {
                        id: hit.get("id")?.as_i64()?,
                        score: hit.get("score")?.as_f64()? as f32,
                        payload: hit.get("payload").cloned().unwrap_or(Value::Null),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}
