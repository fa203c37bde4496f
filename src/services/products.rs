use crate::db::{ProductStore, SettingsStore, StoreClient};
use crate::index::VectorIndexClient;
use crate::rag::chat::product_hit_line;
use crate::rag::{render, ChatOrchestrator, EmbeddingClient, SourceItem, SyncPipeline};
use crate::types::{
    ChatRequest, ProcessReport, Product, ProductsUpserted, Result, SearchRequest, SearchResponse,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Product-catalog variant of the gateway. Same pipeline as content, but
/// all rows target one settings-driven collection and chat speaks in the
/// customer-support register.
pub struct ProductService {
    products: ProductStore,
    settings: Arc<SettingsStore>,
    http: reqwest::Client,
}

impl ProductService {
    pub fn new(
        store: Arc<StoreClient>,
        settings: Arc<SettingsStore>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            products: ProductStore::new(store),
            settings,
            http,
        }
    }

    pub async fn upsert(&self, products: Vec<Product>) -> Result<ProductsUpserted> {
        let count = self.products.upsert_many(&products).await?;

        info!(products = count, "Product catalog updated");

        Ok(ProductsUpserted {
            status: "success".to_string(),
            products_synced: count,
        })
    }

    pub async fn list(&self) -> Result<Vec<Product>> {
        self.products.list_all().await
    }

    /// Embed and upsert the whole catalog into the product collection.
    pub async fn process(&self) -> Result<ProcessReport> {
        let config = self.settings.config();
        let collection = config.product_collection_name.clone();

        let rows = self.products.list_all().await?;
        let items = rows
            .into_iter()
            .map(|product| product_item(product, &collection))
            .collect();

        SyncPipeline::new(&config, &self.http).run(items).await
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let config = self.settings.config();
        let collection = request
            .collection_name
            .clone()
            .unwrap_or_else(|| config.product_collection_name.clone());
        let limit = request.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

        let embeddings = EmbeddingClient::new(self.http.clone(), config.ollama_url.clone());
        let vector = embeddings.embed(&config.model, &request.query).await?;

        let index = VectorIndexClient::new(self.http.clone(), config.index_url.clone());
        let results = index.search(&collection, &vector, limit).await?;

        Ok(SearchResponse { results })
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<mpsc::Receiver<String>> {
        let config = self.settings.config();
        let collection = request
            .collection_name
            .clone()
            .unwrap_or_else(|| config.product_collection_name.clone());

        let orchestrator = ChatOrchestrator::new(
            &config,
            &self.http,
            config.product_templates.clone(),
            product_hit_line,
        );

        orchestrator
            .stream_chat(&request.model, &request.prompt, &collection)
            .await
    }
}

fn product_item(product: Product, collection: &str) -> SourceItem {
    let text = render::product_text(&product);
    let payload = json!({
        "title": product.title,
        "description": product.description,
        "url": product.url,
        "variations": product.variations,
        "attributes": product.attributes,
    });

    SourceItem {
        id: product.id,
        collection: collection.to_string(),
        text,
        payload,
    }
}
