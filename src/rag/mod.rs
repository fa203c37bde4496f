//! The retrieval-augmented generation core.
//!
//! Two flows run through this module:
//!
//! 1. **Sync**: buffered records are rendered to text, embedded, and
//!    upserted into the vector index ([`pipeline`]).
//! 2. **Chat**: a prompt is embedded, nearest neighbors are retrieved, a
//!    context template is filled in, and the generation stream is relayed
//!    to the caller ([`chat`]).
//!
//! Both flows treat the embedding and index services as soft dependencies:
//! a per-record embedding failure skips that record, and any retrieval
//! failure during chat degrades the context instead of aborting the request.

pub mod chat;
pub mod embeddings;
pub mod pipeline;
pub mod render;

pub use chat::ChatOrchestrator;
pub use embeddings::EmbeddingClient;
pub use pipeline::{SourceItem, SyncPipeline};
