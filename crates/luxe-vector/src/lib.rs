//! Luxe Vector crate - embedding service, flat vector index, product catalog,
//! and the retrieval engine that joins them.
//!
//! The catalog and index are produced together by an offline build step and
//! are read-only at serving time. `ProductTable` pairs them by position so
//! the two can never drift apart once loaded.

pub mod catalog;
pub mod embedding;
pub mod index;
pub mod retrieval;

pub use catalog::{CatalogStore, ProductTable};
pub use embedding::{DynEmbeddingService, EmbeddingService, MockEmbedding, OnnxEmbeddingService};
pub use index::{IndexHit, VectorIndex};
pub use retrieval::RetrievalEngine;
