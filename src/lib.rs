//! # ragway - Retrieval-Augmented Generation Gateway
//!
//! A gateway that buffers arbitrary content and product records, converts
//! them to vector embeddings through an external embedding model, keeps
//! those vectors in an external vector index, and streams chat completions
//! augmented with retrieved context.
//!
//! ## Data flow
//!
//! ```text
//! caller -> content buffer -> sync pipeline -> vector index
//!                              (render, embed, upsert per collection)
//!
//! caller -> chat orchestrator -> embed -> search -> template -> generate
//!                                                   (streamed NDJSON relay)
//! ```
//!
//! The buffer and settings rows are the durable truth; the vector index is
//! a rebuildable cache of them. Retrieval is a soft dependency everywhere:
//! a record that fails to embed is skipped, a chat whose search fails still
//! answers with a degraded context. Only the generation call itself can
//! fail a chat request.
//!
//! ## Modules
//!
//! - [`api`] - Axum handlers and routes
//! - [`db`] - settings, content buffer, and product catalog over libsql
//! - [`index`] - REST client for the vector index service
//! - [`llm`] - streaming generation client
//! - [`rag`] - render/embed/sync pipeline and chat orchestration
//! - [`services`] - the content and product service variants
//! - [`types`] - shared request/response types and error taxonomy

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Relational storage: settings, content buffer, product catalog.
pub mod db;
/// Vector index client.
pub mod index;
/// Generation service client.
pub mod llm;
/// Retrieval-augmented generation pipeline and chat orchestration.
pub mod rag;
/// The content and product service variants.
pub mod services;
/// Common types and error handling.
pub mod types;

// Re-export commonly used types
pub use db::{RuntimeConfig, SettingsStore, StoreClient};
pub use index::VectorIndexClient;
pub use rag::{ChatOrchestrator, EmbeddingClient, SyncPipeline};
pub use services::{ContentService, ProductService};
pub use types::{AppError, Result};

use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Settings rows plus the cached runtime configuration snapshot.
    pub settings: Arc<SettingsStore>,
    /// Buffered-content service.
    pub content: Arc<ContentService>,
    /// Product-catalog service.
    pub products: Arc<ProductService>,
}

impl AppState {
    /// Wire up the full state over one database and one HTTP connection
    /// pool.
    pub async fn new(store: Arc<StoreClient>, http: reqwest::Client) -> Result<Self> {
        let settings = Arc::new(SettingsStore::new(Arc::clone(&store)).await?);

        Ok(Self {
            content: Arc::new(ContentService::new(
                Arc::clone(&store),
                Arc::clone(&settings),
                http.clone(),
            )),
            products: Arc::new(ProductService::new(
                Arc::clone(&store),
                Arc::clone(&settings),
                http,
            )),
            settings,
        })
    }
}
