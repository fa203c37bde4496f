//! Storage tests: settings resolution/invalidation, the content buffer,
//! and the product catalog, all against in-memory SQLite.

use ragway::db::{ContentBuffer, ProductStore, SettingsStore, StoreClient};
use ragway::types::{AppError, Product};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

async fn test_store() -> Arc<StoreClient> {
    Arc::new(
        StoreClient::new_memory()
            .await
            .expect("Failed to create in-memory database"),
    )
}

fn updates(pairs: &[(&str, Option<&str>)]) -> BTreeMap<String, Option<String>> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
        .collect()
}

// ============= Settings =============

#[tokio::test]
async fn absent_setting_resolves_to_the_supplied_default() {
    let settings = SettingsStore::new(test_store().await).await.unwrap();

    let value = settings.get("no_such_key", "fallback").await.unwrap();

    assert_eq!(value, "fallback");
}

#[tokio::test]
async fn set_then_get_round_trips() {
    let settings = SettingsStore::new(test_store().await).await.unwrap();

    let written = settings
        .set(&updates(&[("llama_model", Some("mistral:7b"))]))
        .await
        .unwrap();

    assert_eq!(written, ["llama_model"]);
    assert_eq!(
        settings.get("llama_model", "default").await.unwrap(),
        "mistral:7b"
    );
}

#[tokio::test]
async fn set_updates_existing_keys_in_place() {
    let settings = SettingsStore::new(test_store().await).await.unwrap();

    settings
        .set(&updates(&[("vector_size", Some("4096"))]))
        .await
        .unwrap();
    settings
        .set(&updates(&[("vector_size", Some("384"))]))
        .await
        .unwrap();

    let all = settings.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all["vector_size"], Some("384".to_string()));
}

#[tokio::test]
async fn get_one_errors_on_missing_key() {
    let settings = SettingsStore::new(test_store().await).await.unwrap();

    let err = settings.get_one("missing").await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn settings_write_swaps_the_config_snapshot() {
    let settings = SettingsStore::new(test_store().await).await.unwrap();

    let before = settings.config();
    assert_eq!(before.default_collection_name, "content");

    settings
        .set(&updates(&[
            ("default_collection_name", Some("handbook")),
            ("qdrant_host", Some("index.internal")),
        ]))
        .await
        .unwrap();

    let after = settings.config();
    assert_eq!(after.default_collection_name, "handbook");
    assert_eq!(after.index_url, "http://index.internal:6333");

    // The pre-change snapshot is immutable; in-flight requests keep it.
    assert_eq!(before.default_collection_name, "content");
}

#[tokio::test]
async fn null_setting_value_falls_back_to_default() {
    let settings = SettingsStore::new(test_store().await).await.unwrap();

    settings
        .set(&updates(&[("llama_model", None)]))
        .await
        .unwrap();

    assert_eq!(settings.config().model, "llama3:latest");
    assert_eq!(settings.get("llama_model", "fallback").await.unwrap(), "fallback");
}

// ============= Content buffer =============

#[tokio::test]
async fn add_assigns_sequential_ids() {
    let buffer = ContentBuffer::new(test_store().await);

    let first = buffer
        .add(None, "docs", &json!({"title": "one"}))
        .await
        .unwrap();
    let second = buffer
        .add(Some("a2"), "docs", &json!({"title": "two"}))
        .await
        .unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(second.source_id.as_deref(), Some("a2"));
}

#[tokio::test]
async fn add_rejects_empty_collection_name() {
    let buffer = ContentBuffer::new(test_store().await);

    let err = buffer.add(None, "  ", &json!({})).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn list_filters_by_collection() {
    let buffer = ContentBuffer::new(test_store().await);
    buffer.add(None, "docs", &json!({"n": 1})).await.unwrap();
    buffer.add(None, "faq", &json!({"n": 2})).await.unwrap();
    buffer.add(None, "docs", &json!({"n": 3})).await.unwrap();

    let docs = buffer.list_all(Some("docs")).await.unwrap();
    let all = buffer.list_all(None).await.unwrap();

    assert_eq!(docs.len(), 2);
    assert!(docs.iter().all(|r| r.collection_name == "docs"));
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn payload_round_trips_through_storage() {
    let buffer = ContentBuffer::new(test_store().await);
    let payload = json!({"title": "Intro", "tags": ["a", "b"], "depth": 2});

    buffer.add(None, "docs", &payload).await.unwrap();
    let records = buffer.list_all(None).await.unwrap();

    assert_eq!(records[0].payload, payload);
}

#[tokio::test]
async fn delete_removes_the_row() {
    let buffer = ContentBuffer::new(test_store().await);
    let record = buffer.add(None, "docs", &json!({})).await.unwrap();

    buffer.delete(record.id).await.unwrap();

    assert!(buffer.list_all(None).await.unwrap().is_empty());
    assert!(matches!(
        buffer.get(record.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn deleting_a_missing_record_is_not_found() {
    let buffer = ContentBuffer::new(test_store().await);

    let err = buffer.delete(42).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

// ============= Product catalog =============

#[tokio::test]
async fn product_upsert_overwrites_by_id() {
    let products = ProductStore::new(test_store().await);

    products
        .upsert_many(&[Product {
            id: 7,
            title: "Widget".to_string(),
            description: None,
            attributes: None,
            variations: None,
            url: None,
        }])
        .await
        .unwrap();
    products
        .upsert_many(&[Product {
            id: 7,
            title: "Widget v2".to_string(),
            description: Some("now with rims".to_string()),
            attributes: None,
            variations: None,
            url: None,
        }])
        .await
        .unwrap();

    let rows = products.list_all().await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "Widget v2");
    assert_eq!(rows[0].description.as_deref(), Some("now with rims"));
}

#[tokio::test]
async fn product_upsert_rejects_empty_titles() {
    let products = ProductStore::new(test_store().await);

    let err = products
        .upsert_many(&[Product {
            id: 1,
            title: String::new(),
            description: None,
            attributes: None,
            variations: None,
            url: None,
        }])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}
