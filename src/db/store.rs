use crate::types::{AppError, Result};
use libsql::{Builder, Connection, Database};

/// Shared handle to the gateway's SQLite database.
///
/// Owns schema initialization; the per-table stores borrow connections
/// through [`StoreClient::connection`].
///
/// A single connection is opened up front and shared (cloned) by every
/// caller. This keeps the `:memory:` database alive and visible across all
/// stores — each fresh `Database::connect()` to `:memory:` would otherwise
/// open an independent, empty database.
pub struct StoreClient {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl StoreClient {
    /// Open (or create) a local database file.
    pub async fn new_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to open database: {}", e)))?;

        let conn = db
            .connect()
            .map_err(|e| AppError::Storage(format!("Failed to get connection: {}", e)))?;

        let client = Self { db, conn };
        client.initialize_schema().await?;

        Ok(client)
    }

    /// In-memory database, used by tests.
    pub async fn new_memory() -> Result<Self> {
        Self::new_local(":memory:").await
    }

    pub fn connection(&self) -> Result<Connection> {
        Ok(self.conn.clone())
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                key TEXT UNIQUE NOT NULL,
                value TEXT
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Storage(format!("Failed to create settings table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS content_buffer (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_id TEXT,
                collection_name TEXT NOT NULL,
                payload TEXT NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Storage(format!("Failed to create content_buffer table: {}", e)))?;

        // Product ids come from the upstream catalog, so no AUTOINCREMENT here.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                attributes TEXT,
                variations TEXT,
                url TEXT
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Storage(format!("Failed to create products table: {}", e)))?;

        Ok(())
    }
}
