//! HTTP API layer, built on Axum.
//!
//! # Endpoints
//!
//! ## Content (`/api/v1/content`)
//! - `POST /api/v1/content` - buffer a record
//! - `GET /api/v1/content?collection_name=` - list buffered records
//! - `DELETE /api/v1/content/{id}` - delete a record (+ its vector point)
//! - `POST /api/v1/content/process?collection_name=` - sync buffer to the index
//! - `POST /api/v1/content/search` - nearest-neighbor search
//! - `POST /api/v1/content/chat` - RAG chat, streams `application/x-ndjson`
//!
//! ## Products (`/api/v1/products`)
//! - `POST /api/v1/products` - upsert catalog rows
//! - `GET /api/v1/products` - list the catalog
//! - `POST /api/v1/products/process` - sync catalog to the index
//! - `POST /api/v1/products/search` - search the product collection
//! - `POST /api/v1/products/chat` - product-flavored RAG chat
//!
//! ## Settings (`/api/v1/settings`)
//! - `GET /api/v1/settings` - all settings rows
//! - `PUT /api/v1/settings` - upsert settings, invalidating derived config
//! - `GET /api/v1/settings/{key}` - one setting
//!
//! ## Health
//! - `GET /health`

/// Request handlers for each endpoint group.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
