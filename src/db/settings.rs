//! Settings store and the resolved runtime configuration.
//!
//! Settings are plain key/value rows. Dependent components never read rows
//! directly; they take a [`RuntimeConfig`] snapshot resolved from the rows,
//! held behind an `ArcSwap`. Every successful write rebuilds the snapshot
//! and swaps it atomically, so the next request sees the new values while
//! in-flight requests finish with the old ones.

use crate::db::StoreClient;
use crate::types::{AppError, Result, Setting};
use arc_swap::ArcSwap;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

// ============= Defaults =============

const DEFAULT_OLLAMA_URL: &str = "http://ollama:11434";
const DEFAULT_INDEX_HOST: &str = "qdrant";
const DEFAULT_INDEX_PORT: u16 = 6333;
const DEFAULT_COLLECTION_NAME: &str = "content";
const DEFAULT_PRODUCT_COLLECTION_NAME: &str = "products";
const DEFAULT_VECTOR_SIZE: u64 = 4096;
const DEFAULT_MODEL: &str = "llama3:latest";

const DEFAULT_CONTEXT_TEMPLATE: &str = "You are a helpful assistant. The user asked: '{prompt}'.\nHere is some relevant content that may help answer their question:\n{content_list}\nPlease answer the user's question using this context when relevant.";
const DEFAULT_SEARCH_FAILED_TEMPLATE: &str = "You are a helpful assistant. The user asked: '{prompt}'.\n(Content search failed, so just answer as best as you can.)";
const DEFAULT_NO_RESULTS_TEMPLATE: &str = "You are a helpful assistant. The user asked: '{prompt}'.\nNo relevant content was found. Please answer as best as you can.";

const DEFAULT_PRODUCT_CONTEXT_TEMPLATE: &str = "You are a helpful customer support agent. The user asked: '{prompt}'.\nHere are some relevant products from our catalog that may help answer their question:\n{content_list}\nPlease answer the user's question and, if relevant, mention these products and their URLs.";
const DEFAULT_PRODUCT_SEARCH_FAILED_TEMPLATE: &str = "You are a helpful customer support agent. The user asked: '{prompt}'.\n(Product search failed, so just answer as best as you can.)";
const DEFAULT_PRODUCT_NO_RESULTS_TEMPLATE: &str = "You are a helpful customer support agent. The user asked: '{prompt}'.\nNo relevant products were found in the catalog. Please answer as best as you can.";

// ============= Runtime Configuration =============

/// One RAG prompt template set: the normal context template plus the two
/// degradation fallbacks. Templates carry `{prompt}` and `{content_list}`
/// substitution slots.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub context: String,
    pub search_failed: String,
    pub no_results: String,
}

/// Immutable snapshot of every setting-driven tunable.
///
/// Rebuilt wholesale on settings writes; cheap to clone via `Arc`.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Base URL of the embedding/generation service.
    pub ollama_url: String,
    /// Base URL of the vector index service, assembled from host + port rows.
    pub index_url: String,
    pub default_collection_name: String,
    pub product_collection_name: String,
    pub vector_size: u64,
    /// Model used for both embeddings and generation.
    pub model: String,
    pub content_templates: PromptTemplates,
    pub product_templates: PromptTemplates,
}

impl RuntimeConfig {
    fn resolve(rows: &BTreeMap<String, Option<String>>) -> Self {
        let get = |key: &str, default: &str| -> String {
            rows.get(key)
                .and_then(|v| v.clone())
                .unwrap_or_else(|| default.to_string())
        };

        let index_host = get("qdrant_host", DEFAULT_INDEX_HOST);
        let index_port = rows
            .get("qdrant_port")
            .and_then(|v| v.as_deref())
            .map(|raw| {
                raw.parse::<u16>().unwrap_or_else(|_| {
                    warn!(value = raw, "qdrant_port is not a number, using default");
                    DEFAULT_INDEX_PORT
                })
            })
            .unwrap_or(DEFAULT_INDEX_PORT);

        let vector_size = rows
            .get("vector_size")
            .and_then(|v| v.as_deref())
            .map(|raw| {
                raw.parse::<u64>().unwrap_or_else(|_| {
                    warn!(value = raw, "vector_size is not a number, using default");
                    DEFAULT_VECTOR_SIZE
                })
            })
            .unwrap_or(DEFAULT_VECTOR_SIZE);

        Self {
            ollama_url: get("ollama_url", DEFAULT_OLLAMA_URL),
            index_url: format!("http://{}:{}", index_host, index_port),
            default_collection_name: get("default_collection_name", DEFAULT_COLLECTION_NAME),
            product_collection_name: get(
                "product_collection_name",
                DEFAULT_PRODUCT_COLLECTION_NAME,
            ),
            vector_size,
            model: get("llama_model", DEFAULT_MODEL),
            content_templates: PromptTemplates {
                context: get("rag_context_template", DEFAULT_CONTEXT_TEMPLATE),
                search_failed: get("rag_context_search_failed", DEFAULT_SEARCH_FAILED_TEMPLATE),
                no_results: get("rag_context_no_results", DEFAULT_NO_RESULTS_TEMPLATE),
            },
            product_templates: PromptTemplates {
                context: get("product_context_template", DEFAULT_PRODUCT_CONTEXT_TEMPLATE),
                search_failed: get(
                    "product_context_search_failed",
                    DEFAULT_PRODUCT_SEARCH_FAILED_TEMPLATE,
                ),
                no_results: get(
                    "product_context_no_results",
                    DEFAULT_PRODUCT_NO_RESULTS_TEMPLATE,
                ),
            },
        }
    }
}

// ============= Settings Store =============

/// Key/value settings rows plus the cached [`RuntimeConfig`] snapshot.
pub struct SettingsStore {
    store: Arc<StoreClient>,
    current: ArcSwap<RuntimeConfig>,
}

impl SettingsStore {
    pub async fn new(store: Arc<StoreClient>) -> Result<Self> {
        let rows = Self::load_rows(&store).await?;
        let config = RuntimeConfig::resolve(&rows);

        Ok(Self {
            store,
            current: ArcSwap::from_pointee(config),
        })
    }

    /// Current configuration snapshot (lockless read).
    pub fn config(&self) -> Arc<RuntimeConfig> {
        self.current.load_full()
    }

    /// Read a single setting, falling back to the supplied default when the
    /// key is absent. Absence is never an error.
    pub async fn get(&self, key: &str, default: &str) -> Result<String> {
        let conn = self.store.connection()?;

        let mut rows = conn
            .query("SELECT value FROM settings WHERE key = ?", [key])
            .await
            .map_err(|e| AppError::Storage(format!("Failed to query setting: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?
        {
            Some(row) => {
                let value: Option<String> =
                    row.get(0).map_err(|e| AppError::Storage(e.to_string()))?;
                Ok(value.unwrap_or_else(|| default.to_string()))
            }
            None => Ok(default.to_string()),
        }
    }

    /// Read a single setting, erroring when the key does not exist.
    pub async fn get_one(&self, key: &str) -> Result<Setting> {
        let conn = self.store.connection()?;

        let mut rows = conn
            .query("SELECT key, value FROM settings WHERE key = ?", [key])
            .await
            .map_err(|e| AppError::Storage(format!("Failed to query setting: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?
        {
            Some(row) => Ok(Setting {
                key: row.get(0).map_err(|e| AppError::Storage(e.to_string()))?,
                value: row.get(1).map_err(|e| AppError::Storage(e.to_string()))?,
            }),
            None => Err(AppError::NotFound(format!("Setting '{}' not found", key))),
        }
    }

    pub async fn get_all(&self) -> Result<BTreeMap<String, Option<String>>> {
        Self::load_rows(&self.store).await
    }

    /// Upsert the given keys in one transaction, then rebuild and swap the
    /// config snapshot. Returns the keys that were written. A mid-write
    /// failure rolls the whole batch back and leaves the snapshot alone.
    pub async fn set(&self, updates: &BTreeMap<String, Option<String>>) -> Result<Vec<String>> {
        let conn = self.store.connection()?;

        let tx = conn
            .transaction()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to begin transaction: {}", e)))?;

        for (key, value) in updates {
            tx.execute(
                "INSERT INTO settings (key, value) VALUES (?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                (key.as_str(), value.as_deref()),
            )
            .await
            .map_err(|e| AppError::Storage(format!("Failed to update setting: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to commit settings: {}", e)))?;

        self.invalidate().await?;

        Ok(updates.keys().cloned().collect())
    }

    /// Re-resolve the snapshot from the current rows.
    async fn invalidate(&self) -> Result<()> {
        let rows = Self::load_rows(&self.store).await?;
        self.current.store(Arc::new(RuntimeConfig::resolve(&rows)));
        Ok(())
    }

    async fn load_rows(store: &StoreClient) -> Result<BTreeMap<String, Option<String>>> {
        let conn = store.connection()?;

        let mut rows = conn
            .query("SELECT key, value FROM settings", ())
            .await
            .map_err(|e| AppError::Storage(format!("Failed to query settings: {}", e)))?;

        let mut map = BTreeMap::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?
        {
            let key: String = row.get(0).map_err(|e| AppError::Storage(e.to_string()))?;
            let value: Option<String> =
                row.get(1).map_err(|e| AppError::Storage(e.to_string()))?;
            map.insert(key, value);
        }

        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_uses_defaults_for_absent_keys() {
        let config = RuntimeConfig::resolve(&BTreeMap::new());

        assert_eq!(config.ollama_url, "http://ollama:11434");
        assert_eq!(config.index_url, "http://qdrant:6333");
        assert_eq!(config.default_collection_name, "content");
        assert_eq!(config.vector_size, 4096);
        assert_eq!(config.model, "llama3:latest");
    }

    #[test]
    fn resolve_reads_rows_over_defaults() {
        let mut rows = BTreeMap::new();
        rows.insert("qdrant_host".to_string(), Some("localhost".to_string()));
        rows.insert("qdrant_port".to_string(), Some("7000".to_string()));
        rows.insert("vector_size".to_string(), Some("384".to_string()));

        let config = RuntimeConfig::resolve(&rows);

        assert_eq!(config.index_url, "http://localhost:7000");
        assert_eq!(config.vector_size, 384);
    }

    #[test]
    fn resolve_falls_back_on_unparsable_numbers() {
        let mut rows = BTreeMap::new();
        rows.insert("vector_size".to_string(), Some("huge".to_string()));

        let config = RuntimeConfig::resolve(&rows);

        assert_eq!(config.vector_size, 4096);
    }

    #[test]
    fn resolve_treats_null_value_as_absent() {
        let mut rows = BTreeMap::new();
        rows.insert("default_collection_name".to_string(), None);

        let config = RuntimeConfig::resolve(&rows);

        assert_eq!(config.default_collection_name, "content");
    }
}
