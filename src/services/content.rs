use crate::db::{ContentBuffer, SettingsStore, StoreClient};
use crate::index::VectorIndexClient;
use crate::rag::chat::content_hit_line;
use crate::rag::{render, ChatOrchestrator, EmbeddingClient, SourceItem, SyncPipeline};
use crate::types::{
    BufferedRecord, ChatRequest, ContentCreateRequest, ContentCreated, DeleteAck, ProcessReport,
    Result, SearchRequest, SearchResponse,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Buffered-content variant of the gateway.
pub struct ContentService {
    buffer: ContentBuffer,
    settings: Arc<SettingsStore>,
    http: reqwest::Client,
}

impl ContentService {
    pub fn new(
        store: Arc<StoreClient>,
        settings: Arc<SettingsStore>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            buffer: ContentBuffer::new(store),
            settings,
            http,
        }
    }

    pub async fn add(&self, request: ContentCreateRequest) -> Result<ContentCreated> {
        let record = self
            .buffer
            .add(
                request.source_id.as_deref(),
                &request.collection_name,
                &request.payload,
            )
            .await?;

        info!(
            id = record.id,
            collection = %record.collection_name,
            "Content buffered"
        );

        Ok(ContentCreated {
            status: "success".to_string(),
            id: record.id,
            source_id: record.source_id,
            collection_name: record.collection_name,
        })
    }

    pub async fn list(&self, collection_name: Option<&str>) -> Result<Vec<BufferedRecord>> {
        self.buffer.list_all(collection_name).await
    }

    /// Delete a buffered record and, best-effort, its vector point. The
    /// buffer is the source of truth, so a failed index deletion is logged
    /// and the delete still succeeds.
    pub async fn delete(&self, id: i64) -> Result<DeleteAck> {
        let record = self.buffer.get(id).await?;

        let config = self.settings.config();
        let index = VectorIndexClient::new(self.http.clone(), config.index_url.clone());
        if let Err(e) = index.delete_points(&record.collection_name, &[id]).await {
            warn!(id, error = %e, "Failed to delete vector point, continuing with buffer delete");
        }

        self.buffer.delete(id).await?;

        Ok(DeleteAck {
            status: "success".to_string(),
            id,
        })
    }

    /// Run one sync pass over the buffer, optionally restricted to a single
    /// collection.
    pub async fn process(&self, collection_name: Option<&str>) -> Result<ProcessReport> {
        let config = self.settings.config();
        let records = self.buffer.list_all(collection_name).await?;
        let items = records.into_iter().map(buffered_item).collect();

        SyncPipeline::new(&config, &self.http).run(items).await
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let config = self.settings.config();
        let collection = request
            .collection_name
            .clone()
            .unwrap_or_else(|| config.default_collection_name.clone());
        let limit = request.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

        let embeddings = EmbeddingClient::new(self.http.clone(), config.ollama_url.clone());
        let vector = embeddings.embed(&config.model, &request.query).await?;

        let index = VectorIndexClient::new(self.http.clone(), config.index_url.clone());
        let results = index.search(&collection, &vector, limit).await?;

        Ok(SearchResponse { results })
    }

    /// Retrieval-augmented chat over the content index. Returns the relay
    /// channel of NDJSON records.
    pub async fn chat(&self, request: &ChatRequest) -> Result<mpsc::Receiver<String>> {
        let config = self.settings.config();
        let collection = request
            .collection_name
            .clone()
            .unwrap_or_else(|| config.default_collection_name.clone());

        let orchestrator = ChatOrchestrator::new(
            &config,
            &self.http,
            config.content_templates.clone(),
            content_hit_line,
        );

        orchestrator
            .stream_chat(&request.model, &request.prompt, &collection)
            .await
    }
}

/// Turn a buffered record into pipeline input. The stored vector payload
/// merges the record's own fields with its source id and collection so
/// search hits are self-describing.
fn buffered_item(record: BufferedRecord) -> SourceItem {
    let text = render::record_text(record.source_id.as_deref(), &record.payload);

    let mut merged = serde_json::Map::new();
    merged.insert("source_id".to_string(), json!(record.source_id));
    merged.insert(
        "collection_name".to_string(),
        json!(record.collection_name.clone()),
    );
    match record.payload {
        Value::Object(fields) => merged.extend(fields),
        other => {
            merged.insert("payload".to_string(), other);
        }
    }

    SourceItem {
        id: record.id,
        collection: record.collection_name,
        text,
        payload: Value::Object(merged),
    }
}
