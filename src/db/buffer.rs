use crate::db::StoreClient;
use crate::types::{AppError, BufferedRecord, Result};
use std::sync::Arc;

/// The content buffer: append-mostly rows waiting to be embedded.
///
/// Rows are immutable once written. The row id is reused as the vector-point
/// id, which is what makes re-processing idempotent.
pub struct ContentBuffer {
    store: Arc<StoreClient>,
}

impl ContentBuffer {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    pub async fn add(
        &self,
        source_id: Option<&str>,
        collection_name: &str,
        payload: &serde_json::Value,
    ) -> Result<BufferedRecord> {
        if collection_name.trim().is_empty() {
            return Err(AppError::Validation(
                "collection_name is required".to_string(),
            ));
        }

        let conn = self.store.connection()?;
        let payload_json = serde_json::to_string(payload)
            .map_err(|e| AppError::Validation(format!("Unserializable payload: {}", e)))?;

        conn.execute(
            "INSERT INTO content_buffer (source_id, collection_name, payload)
             VALUES (?, ?, ?)",
            (source_id, collection_name, payload_json),
        )
        .await
        .map_err(|e| AppError::Storage(format!("Failed to add content: {}", e)))?;

        Ok(BufferedRecord {
            id: conn.last_insert_rowid(),
            source_id: source_id.map(str::to_string),
            collection_name: collection_name.to_string(),
            payload: payload.clone(),
        })
    }

    /// List buffered records, optionally restricted to one collection.
    pub async fn list_all(&self, collection_name: Option<&str>) -> Result<Vec<BufferedRecord>> {
        let conn = self.store.connection()?;

        let mut rows = match collection_name {
            Some(name) => conn
                .query(
                    "SELECT id, source_id, collection_name, payload FROM content_buffer
                     WHERE collection_name = ? ORDER BY id ASC",
                    [name],
                )
                .await,
            None => {
                conn.query(
                    "SELECT id, source_id, collection_name, payload FROM content_buffer
                     ORDER BY id ASC",
                    (),
                )
                .await
            }
        }
        .map_err(|e| AppError::Storage(format!("Failed to query content: {}", e)))?;

        let mut records = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?
        {
            let payload_json: String =
                row.get(3).map_err(|e| AppError::Storage(e.to_string()))?;

            records.push(BufferedRecord {
                id: row.get(0).map_err(|e| AppError::Storage(e.to_string()))?,
                source_id: row.get(1).map_err(|e| AppError::Storage(e.to_string()))?,
                collection_name: row.get(2).map_err(|e| AppError::Storage(e.to_string()))?,
                payload: serde_json::from_str(&payload_json)
                    .map_err(|e| AppError::Storage(format!("Corrupt payload row: {}", e)))?,
            });
        }

        Ok(records)
    }

    pub async fn get(&self, id: i64) -> Result<BufferedRecord> {
        let conn = self.store.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, source_id, collection_name, payload FROM content_buffer
                 WHERE id = ?",
                [id],
            )
            .await
            .map_err(|e| AppError::Storage(format!("Failed to query content: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?
        {
            Some(row) => {
                let payload_json: String =
                    row.get(3).map_err(|e| AppError::Storage(e.to_string()))?;

                Ok(BufferedRecord {
                    id: row.get(0).map_err(|e| AppError::Storage(e.to_string()))?,
                    source_id: row.get(1).map_err(|e| AppError::Storage(e.to_string()))?,
                    collection_name: row.get(2).map_err(|e| AppError::Storage(e.to_string()))?,
                    payload: serde_json::from_str(&payload_json)
                        .map_err(|e| AppError::Storage(format!("Corrupt payload row: {}", e)))?,
                })
            }
            None => Err(AppError::NotFound("Content not found".to_string())),
        }
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let conn = self.store.connection()?;

        let affected = conn
            .execute("DELETE FROM content_buffer WHERE id = ?", [id])
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete content: {}", e)))?;

        if affected == 0 {
            return Err(AppError::NotFound("Content not found".to_string()));
        }

        Ok(())
    }
}
