//! Shared test harness.
//!
//! Spins up one mock server for the model service (embeddings + generation)
//! and one for the vector index, then points the gateway's runtime config
//! at them through the settings store, the same way a deployment would.

#![allow(dead_code)]

use ragway::{AppState, StoreClient};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct TestGateway {
    pub state: AppState,
    /// Embedding + generation endpoints.
    pub model_server: MockServer,
    /// Vector index endpoints.
    pub index_server: MockServer,
}

pub async fn gateway() -> TestGateway {
    let model_server = MockServer::start().await;
    let index_server = MockServer::start().await;

    let store = Arc::new(
        StoreClient::new_memory()
            .await
            .expect("Failed to create in-memory database"),
    );
    let state = AppState::new(store, reqwest::Client::new())
        .await
        .expect("Failed to build app state");

    let (host, port) = split_host_port(&index_server.uri());
    let mut updates = BTreeMap::new();
    updates.insert("ollama_url".to_string(), Some(model_server.uri()));
    updates.insert("qdrant_host".to_string(), Some(host));
    updates.insert("qdrant_port".to_string(), Some(port));
    updates.insert("vector_size".to_string(), Some("4".to_string()));
    state
        .settings
        .set(&updates)
        .await
        .expect("Failed to point settings at mock servers");

    TestGateway {
        state,
        model_server,
        index_server,
    }
}

fn split_host_port(uri: &str) -> (String, String) {
    let stripped = uri.strip_prefix("http://").expect("mock uri is http");
    let (host, port) = stripped.split_once(':').expect("mock uri has a port");
    (host.to_string(), port.to_string())
}

/// Mount a happy-path embedding mock returning the given vector.
pub async fn mock_embedding(server: &MockServer, vector: &[f32]) {
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": vector})))
        .mount(server)
        .await;
}

/// Mount collection probe + create + upsert mocks for one collection.
pub async fn mock_new_collection(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/collections/{}", name)))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/collections/{}", name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true})))
        .mount(server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/collections/{}/points", name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(server)
        .await;
}

/// Mount an existing-collection probe.
pub async fn mock_collection_exists(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/collections/{}", name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {"status": "green"}})))
        .mount(server)
        .await;
}

/// Mount a search mock returning the given hits.
pub async fn mock_search(server: &MockServer, name: &str, hits: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(format!("/collections/{}/points/search", name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": hits})))
        .mount(server)
        .await;
}

/// Mount a generation mock streaming the given NDJSON body.
pub async fn mock_generation(server: &MockServer, ndjson: &str) {
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(ndjson.as_bytes().to_vec(), "application/x-ndjson"),
        )
        .mount(server)
        .await;
}

/// Drain a chat relay channel into the list of emitted NDJSON records.
pub async fn collect_stream(mut rx: tokio::sync::mpsc::Receiver<String>) -> Vec<String> {
    let mut records = Vec::new();
    while let Some(record) = rx.recv().await {
        records.push(record);
    }
    records
}

/// The prompt sent to the generation service in the most recent
/// `/api/generate` call.
pub async fn last_generation_prompt(server: &MockServer) -> String {
    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");

    let body: serde_json::Value = requests
        .iter()
        .rev()
        .find(|r| r.url.path() == "/api/generate")
        .map(|r| serde_json::from_slice(&r.body).expect("generate body is json"))
        .expect("no generation request recorded");

    body["prompt"].as_str().expect("prompt is a string").to_string()
}

/// Ids carried by every point-upsert request against the given collection,
/// in request order.
pub async fn upserted_id_batches(server: &MockServer, name: &str) -> Vec<Vec<i64>> {
    let upsert_path = format!("/collections/{}/points", name);
    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");

    requests
        .iter()
        .filter(|r| r.url.path() == upsert_path)
        .map(|r| {
            let body: serde_json::Value =
                serde_json::from_slice(&r.body).expect("upsert body is json");
            body["points"]
                .as_array()
                .expect("points is an array")
                .iter()
                .map(|p| p["id"].as_i64().expect("point id is an integer"))
                .collect()
        })
        .collect()
}
