//! Common request/response types and the crate-wide error taxonomy.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

// ============= Content Types =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentCreateRequest {
    #[serde(default)]
    pub source_id: Option<String>,
    pub collection_name: String,
    pub payload: serde_json::Value,
}

/// A row in the content buffer, the durable source of truth for the
/// vector index. `id` doubles as the vector-point id downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferedRecord {
    pub id: i64,
    pub source_id: Option<String>,
    pub collection_name: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContentCreated {
    pub status: String,
    pub id: i64,
    pub source_id: Option<String>,
    pub collection_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteAck {
    pub status: String,
    pub id: i64,
}

// ============= Product Types =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Option<String>,
    #[serde(default)]
    pub variations: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductsUpserted {
    pub status: String,
    pub products_synced: usize,
}

// ============= Search & Chat Types =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: i64,
    pub score: f32,
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default)]
    pub collection_name: Option<String>,
}

// ============= Pipeline Types =============

/// Outcome of one sync pass over the buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessReport {
    pub status: String,
    pub records_processed: usize,
    pub collections: Vec<String>,
}

impl ProcessReport {
    /// Sentinel for an empty (possibly filtered) buffer.
    pub fn no_content() -> Self {
        Self {
            status: "no content found".to_string(),
            records_processed: 0,
            collections: vec![],
        }
    }

    pub fn success(records_processed: usize, collections: Vec<String>) -> Self {
        Self {
            status: "success".to_string(),
            records_processed,
            collections,
        }
    }
}

// ============= Settings Types =============

#[derive(Debug, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsUpdated {
    pub status: String,
    pub updated: Vec<String>,
}

// ============= Error Types =============

/// Crate-wide error taxonomy.
///
/// Everything upstream of the final generation call is a soft dependency:
/// `Embedding` and `Search` failures are recovered locally (a skipped record
/// during sync, a degraded context during chat) and only reach the caller
/// when they occur in a request whose whole purpose was that call.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Generation failed: {message}")]
    Generation {
        message: String,
        /// Upstream HTTP status, preserved for the caller when known.
        status: Option<u16>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Storage(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Embedding(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Search(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Generation { message, status } => (
                status
                    .and_then(|code| StatusCode::from_u16(code).ok())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                message,
            ),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
