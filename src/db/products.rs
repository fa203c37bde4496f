use crate::db::StoreClient;
use crate::types::{AppError, Product, Result};
use std::sync::Arc;

/// Mirrored product catalog. Ids are assigned by the upstream catalog, so
/// writes are upserts keyed on id.
pub struct ProductStore {
    store: Arc<StoreClient>,
}

impl ProductStore {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    pub async fn upsert_many(&self, products: &[Product]) -> Result<usize> {
        let conn = self.store.connection()?;

        for product in products {
            if product.title.trim().is_empty() {
                return Err(AppError::Validation("title is required".to_string()));
            }

            conn.execute(
                "INSERT INTO products (id, title, description, attributes, variations, url)
                 VALUES (?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    attributes = excluded.attributes,
                    variations = excluded.variations,
                    url = excluded.url",
                (
                    product.id,
                    product.title.as_str(),
                    product.description.as_deref(),
                    product.attributes.as_deref(),
                    product.variations.as_deref(),
                    product.url.as_deref(),
                ),
            )
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upsert product: {}", e)))?;
        }

        Ok(products.len())
    }

    pub async fn list_all(&self) -> Result<Vec<Product>> {
        let conn = self.store.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, title, description, attributes, variations, url FROM products
                 ORDER BY id ASC",
                (),
            )
            .await
            .map_err(|e| AppError::Storage(format!("Failed to query products: {}", e)))?;

        let mut products = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?
        {
            products.push(Product {
                id: row.get(0).map_err(|e| AppError::Storage(e.to_string()))?,
                title: row.get(1).map_err(|e| AppError::Storage(e.to_string()))?,
                description: row.get(2).map_err(|e| AppError::Storage(e.to_string()))?,
                attributes: row.get(3).map_err(|e| AppError::Storage(e.to_string()))?,
                variations: row.get(4).map_err(|e| AppError::Storage(e.to_string()))?,
                url: row.get(5).map_err(|e| AppError::Storage(e.to_string()))?,
            });
        }

        Ok(products)
    }
}
