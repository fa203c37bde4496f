use crate::types::{
    BufferedRecord, ChatRequest, ContentCreateRequest, ContentCreated, DeleteAck, ProcessReport,
    Result, SearchRequest, SearchResponse,
};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CollectionFilter {
    #[serde(default)]
    pub collection_name: Option<String>,
}

/// Buffer a content record.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ContentCreateRequest>,
) -> Result<Json<ContentCreated>> {
    state.content.add(payload).await.map(Json)
}

/// List buffered records, optionally filtered to one collection.
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<CollectionFilter>,
) -> Result<Json<Vec<BufferedRecord>>> {
    state
        .content
        .list(filter.collection_name.as_deref())
        .await
        .map(Json)
}

/// Delete a buffered record and, best-effort, its vector point.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteAck>> {
    state.content.delete(id).await.map(Json)
}

/// Run the sync pipeline over the buffer.
pub async fn process(
    State(state): State<AppState>,
    Query(filter): Query<CollectionFilter>,
) -> Result<Json<ProcessReport>> {
    state
        .content
        .process(filter.collection_name.as_deref())
        .await
        .map(Json)
}

/// Nearest-neighbor search over a content collection.
pub async fn search(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    state.content.search(&payload).await.map(Json)
}

/// RAG chat against a content collection, streamed as NDJSON.
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Response> {
    let rx = state.content.chat(&payload).await?;
    Ok(super::ndjson_response(rx))
}
