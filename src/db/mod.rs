//! Relational storage for the gateway.
//!
//! Everything durable lives in one libsql/SQLite database:
//! - **settings**: mutable key/value configuration rows
//! - **content_buffer**: pending records waiting to be embedded
//! - **products**: the mirrored product catalog
//!
//! The vector index is *not* stored here; it is an external system treated
//! as a rebuildable cache of these tables.

#![allow(missing_docs)]

pub mod buffer;
pub mod products;
pub mod settings;
pub mod store;

pub use buffer::ContentBuffer;
pub use products::ProductStore;
pub use settings::{PromptTemplates, RuntimeConfig, SettingsStore};
pub use store::StoreClient;
