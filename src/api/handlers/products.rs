use crate::types::{
    ChatRequest, ProcessReport, Product, ProductsUpserted, Result, SearchRequest, SearchResponse,
};
use crate::AppState;
use axum::extract::State;
use axum::response::Response;
use axum::Json;

/// Upsert catalog rows by their upstream ids.
pub async fn upsert(
    State(state): State<AppState>,
    Json(payload): Json<Vec<Product>>,
) -> Result<Json<ProductsUpserted>> {
    state.products.upsert(payload).await.map(Json)
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    state.products.list().await.map(Json)
}

/// Embed and upsert the catalog into the product collection.
pub async fn process(State(state): State<AppState>) -> Result<Json<ProcessReport>> {
    state.products.process().await.map(Json)
}

pub async fn search(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    state.products.search(&payload).await.map(Json)
}

/// Product-flavored RAG chat, streamed as NDJSON.
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Response> {
    let rx = state.products.chat(&payload).await?;
    Ok(super::ndjson_response(rx))
}
