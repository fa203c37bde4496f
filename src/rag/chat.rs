//! RAG chat orchestration.
//!
//! Per request: probe the collection, embed the prompt, search top-K, fill
//! in a context template, then relay the generation stream to the caller as
//! newline-delimited JSON. Steps 1-3 only ever *degrade* the context; the
//! generation call is the single failure that reaches the caller.
//!
//! The relay is a producer task feeding a bounded channel. The HTTP
//! response body drains the channel; when the caller disconnects the
//! channel closes, the producer bails out, and dropping the upstream
//! response aborts the in-flight generation call.

use crate::db::{PromptTemplates, RuntimeConfig};
use crate::index::VectorIndexClient;
use crate::llm::GenerationClient;
use crate::rag::EmbeddingClient;
use crate::types::{Result, SearchHit};
use futures::StreamExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::warn;

/// Neighbors retrieved per chat prompt.
const TOP_K: usize = 5;
/// Relay channel capacity; backpressure for slow consumers.
const RELAY_BUFFER: usize = 32;

/// Bullet line for a content hit.
pub fn content_hit_line(hit: &SearchHit) -> String {
    format!(
        "- {}: {}",
        hit.payload
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("No title"),
        hit.payload
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or("No url"),
    )
}

/// Bullet line for a product hit.
pub fn product_hit_line(hit: &SearchHit) -> String {
    format!(
        "- {} ({})",
        hit.payload
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("No Title"),
        hit.payload
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or("No URL"),
    )
}

fn render_template(template: &str, prompt: &str, content_list: &str) -> String {
    template
        .replace("{prompt}", prompt)
        .replace("{content_list}", content_list)
}

pub struct ChatOrchestrator {
    embeddings: EmbeddingClient,
    index: VectorIndexClient,
    generation: GenerationClient,
    templates: PromptTemplates,
    model: String,
    format_hit: fn(&SearchHit) -> String,
}

impl ChatOrchestrator {
    pub fn new(
        config: &RuntimeConfig,
        http: &reqwest::Client,
        templates: PromptTemplates,
        format_hit: fn(&SearchHit) -> String,
    ) -> Self {
        Self {
            embeddings: EmbeddingClient::new(http.clone(), config.ollama_url.clone()),
            index: VectorIndexClient::new(http.clone(), config.index_url.clone()),
            generation: GenerationClient::new(http.clone(), config.ollama_url.clone()),
            templates,
            model: config.model.clone(),
            format_hit,
        }
    }

    /// Build the final generation prompt, degrading to a fallback template
    /// at each failure point. This function cannot fail; the worst outcome
    /// is a context that says retrieval was unavailable.
    pub async fn build_prompt(&self, prompt: &str, collection: &str) -> String {
        match self.index.collection_exists(collection).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(collection, "Collection missing, degrading chat context");
                let base = render_template(&self.templates.search_failed, prompt, "");
                return format!(
                    "{}\n\nNote: Collection '{}' has not been synced yet, so no stored context is available.",
                    base, collection
                );
            }
            Err(e) => {
                warn!(collection, error = %e, "Collection probe failed, degrading chat context");
                return render_template(&self.templates.search_failed, prompt, "");
            }
        }

        let vector = match self.embeddings.embed(&self.model, prompt).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Prompt embedding failed, degrading chat context");
                return render_template(&self.templates.search_failed, prompt, "");
            }
        };

        let hits = match self.index.search(collection, &vector, TOP_K).await {
            Ok(h) => h,
            Err(e) => {
                warn!(collection, error = %e, "Vector search failed, degrading chat context");
                return render_template(&self.templates.search_failed, prompt, "");
            }
        };

        if hits.is_empty() {
            warn!(collection, "No hits for chat prompt");
            return render_template(&self.templates.no_results, prompt, "");
        }

        let content_list = hits
            .iter()
            .map(|hit| (self.format_hit)(hit))
            .collect::<Vec<_>>()
            .join("\n");

        render_template(&self.templates.context, prompt, &content_list)
    }

    /// Run the full chat flow and return the relay channel. Each received
    /// `String` is one complete `{"response": ...}\n` NDJSON record.
    pub async fn stream_chat(
        &self,
        model: &str,
        prompt: &str,
        collection: &str,
    ) -> Result<mpsc::Receiver<String>> {
        let final_prompt = self.build_prompt(prompt, collection).await;
        let upstream = self.generation.stream(model, &final_prompt).await?;

        let (tx, rx) = mpsc::channel(RELAY_BUFFER);
        tokio::spawn(relay(upstream, tx));

        Ok(rx)
    }
}

/// Relay the upstream NDJSON stream into the channel, one re-emitted record
/// per upstream fragment. Returning drops `response`, which aborts the
/// upstream connection.
async fn relay(response: reqwest::Response, tx: mpsc::Sender<String>) {
    let upstream = response.bytes_stream();
    tokio::pin!(upstream);

    // Upstream chunk boundaries need not align with line boundaries, so
    // carry the partial tail across chunks.
    let mut pending = String::new();

    while let Some(chunk) = upstream.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Generation stream ended with transport error");
                return;
            }
        };

        pending.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(newline) = pending.find('\n') {
            let line: String = pending.drain(..=newline).collect();
            if !emit_line(line.trim(), &tx).await {
                return;
            }
        }
    }

    // Trailing data without a final newline is still one record.
    let tail = pending.trim().to_string();
    if !tail.is_empty() {
        emit_line(&tail, &tx).await;
    }
}

/// Emit one upstream line. Returns `false` when the relay should stop:
/// the model reported done, or the receiver is gone.
async fn emit_line(line: &str, tx: &mpsc::Sender<String>) -> bool {
    if line.is_empty() {
        return true;
    }

    let data: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        // Malformed chunks are skipped, not fatal.
        Err(_) => return true,
    };

    if let Some(fragment) = data.get("response").and_then(Value::as_str) {
        let record = format!("{}\n", json!({"response": fragment}));
        if tx.send(record).await.is_err() {
            // Receiver dropped: the caller disconnected mid-stream.
            return false;
        }
    }

    !data.get("done").and_then(Value::as_bool).unwrap_or(false)
}
