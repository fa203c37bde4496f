//! The buffer-to-index sync pipeline.
//!
//! One pass: group pending items by collection, make sure each collection
//! exists, embed every item, and upsert the successful subset per
//! collection. Embedding failures skip the single affected item; index
//! failures fail the pass.

use crate::db::RuntimeConfig;
use crate::index::{VectorIndexClient, VectorPoint};
use crate::rag::EmbeddingClient;
use crate::types::{ProcessReport, Result};
use serde_json::Value;
use tracing::{info, warn};

/// One unit of work for the pipeline: the stable id, the collection it
/// belongs to, its embedding text, and the metadata stored alongside the
/// vector.
#[derive(Debug, Clone)]
pub struct SourceItem {
    pub id: i64,
    pub collection: String,
    pub text: String,
    pub payload: Value,
}

pub struct SyncPipeline {
    embeddings: EmbeddingClient,
    index: VectorIndexClient,
    model: String,
    vector_size: u64,
}

impl SyncPipeline {
    pub fn new(config: &RuntimeConfig, http: &reqwest::Client) -> Self {
        Self {
            embeddings: EmbeddingClient::new(http.clone(), config.ollama_url.clone()),
            index: VectorIndexClient::new(http.clone(), config.index_url.clone()),
            model: config.model.clone(),
            vector_size: config.vector_size,
        }
    }

    /// Run one sync pass. Re-running over unchanged items is idempotent:
    /// point ids are the item ids, and upserts overwrite.
    pub async fn run(&self, items: Vec<SourceItem>) -> Result<ProcessReport> {
        if items.is_empty() {
            return Ok(ProcessReport::no_content());
        }

        let groups = group_by_collection(items);

        let mut total_processed = 0;
        let mut collections = Vec::with_capacity(groups.len());

        for (collection, group) in groups {
            self.index
                .ensure_collection(&collection, self.vector_size)
                .await?;

            let mut points = Vec::with_capacity(group.len());
            for item in group {
                match self.embeddings.embed(&self.model, &item.text).await {
                    Ok(vector) => points.push(VectorPoint {
                        id: item.id,
                        vector,
                        payload: item.payload,
                    }),
                    Err(e) => {
                        warn!(
                            record_id = item.id,
                            collection = %collection,
                            error = %e,
                            "Skipping record, embedding failed"
                        );
                    }
                }
            }

            if !points.is_empty() {
                total_processed += self.index.upsert(&collection, &points).await?;
            }

            collections.push(collection);
        }

        info!(
            records_processed = total_processed,
            collections = collections.len(),
            "Sync pass complete"
        );

        Ok(ProcessReport::success(total_processed, collections))
    }
}

/// Partition items by collection, preserving the order collections are
/// first seen in.
fn group_by_collection(items: Vec<SourceItem>) -> Vec<(String, Vec<SourceItem>)> {
    let mut groups: Vec<(String, Vec<SourceItem>)> = Vec::new();

    for item in items {
        match groups.iter_mut().find(|(name, _)| *name == item.collection) {
            Some((_, group)) => group.push(item),
            None => groups.push((item.collection.clone(), vec![item])),
        }
    }

    groups
}
