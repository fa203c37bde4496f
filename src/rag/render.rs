//! Text rendering for embedding input.
//!
//! Payloads are arbitrary JSON documents; what goes to the embedding model
//! is a flat `key: value` representation that keeps field names searchable.
//! Non-string leaves fall back to their compact JSON serialization.

use crate::types::Product;
use serde_json::Value;

/// Render a buffered record into embedding text.
///
/// `source_id`, when present, is prefixed so records stay findable by their
/// upstream identifier.
pub fn record_text(source_id: Option<&str>, payload: &Value) -> String {
    let mut parts = Vec::new();

    if let Some(sid) = source_id {
        parts.push(format!("Source ID: {}", sid));
    }

    flatten_into(&mut parts, payload);

    parts.join(" ")
}

fn flatten_into(parts: &mut Vec<String>, value: &Value) {
    match value {
        Value::Object(fields) => {
            for (key, field) in fields {
                match field {
                    Value::String(s) => parts.push(format!("{}: {}", key, s)),
                    other => parts.push(format!("{}: {}", key, compact(other))),
                }
            }
        }
        other => parts.push(compact(other)),
    }
}

fn compact(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Render a product row into embedding text.
pub fn product_text(product: &Product) -> String {
    format!(
        "Title: {}\nDescription: {}\nURL: {}\nAttributes: {}\nVariations: {}",
        product.title,
        product.description.as_deref().unwrap_or(""),
        product.url.as_deref().unwrap_or(""),
        product.attributes.as_deref().unwrap_or(""),
        product.variations.as_deref().unwrap_or(""),
    )
}
