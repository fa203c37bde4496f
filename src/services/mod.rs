//! The two gateway service variants.
//!
//! [`ContentService`] works the free-form content buffer, where every record
//! names its own collection. [`ProductService`] works the mirrored product
//! catalog against a single settings-driven collection with product-flavored
//! prompt templates. Both compose the same pipeline and orchestrator,
//! rebuilt per call from the current [`RuntimeConfig`] snapshot so settings
//! changes take effect on the next request.
//!
//! [`RuntimeConfig`]: crate::db::RuntimeConfig

pub mod content;
pub mod products;

pub use content::ContentService;
pub use products::ProductService;
