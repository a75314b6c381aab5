//! Retrieval engine: query text in, nearest catalog products out.
//!
//! Combines the embedding service (to embed the query) with the paired
//! product table (to find nearest neighbours). Retrieval problems never
//! reach the caller: a missing index or embedder, or a failed lookup,
//! yields an empty product list.

use std::sync::Arc;

use tracing::{debug, error, warn};

use luxe_core::error::LuxeError;
use luxe_core::types::ProductRecord;

use crate::catalog::ProductTable;
use crate::embedding::{DynEmbeddingService, EmbeddingService};

/// Semantic product search over a read-only table.
///
/// Uses dynamic dispatch (`Box<dyn DynEmbeddingService>`) so that production
/// code can supply `OnnxEmbeddingService` while tests use `MockEmbedding`.
pub struct RetrievalEngine {
    table: Option<Arc<ProductTable>>,
    embedder: Option<Box<dyn DynEmbeddingService>>,
}

impl RetrievalEngine {
    /// Create an engine over a loaded table and embedder.
    pub fn new(table: Arc<ProductTable>, embedder: impl EmbeddingService + 'static) -> Self {
        Self {
            table: Some(table),
            embedder: Some(Box::new(embedder)),
        }
    }

    /// Create an engine from whatever components loaded at startup.
    ///
    /// Either side may be absent, in which case search is disabled.
    pub fn from_parts(
        table: Option<Arc<ProductTable>>,
        embedder: Option<Box<dyn DynEmbeddingService>>,
    ) -> Self {
        Self { table, embedder }
    }

    /// An engine that always returns no products.
    pub fn disabled() -> Self {
        Self {
            table: None,
            embedder: None,
        }
    }

    /// Whether both the index and the embedder are available.
    pub fn is_enabled(&self) -> bool {
        self.table.is_some() && self.embedder.is_some()
    }

    /// Return up to `k` products most similar to `query`, most similar first.
    ///
    /// Never fails: any retrieval error is logged and treated as
    /// "no relevant products".
    pub async fn search(&self, query: &str, k: usize) -> Vec<ProductRecord> {
        match self.try_search(query, k).await {
            Ok(products) => products,
            Err(e) => {
                error!(error = %e, "Error in semantic search");
                Vec::new()
            }
        }
    }

    /// Fallible variant of [`search`](Self::search).
    ///
    /// A disabled engine or `k == 0` succeed with no results. Blank queries
    /// are embedded like any other text.
    pub async fn try_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ProductRecord>, LuxeError> {
        let (table, embedder) = match (&self.table, &self.embedder) {
            (Some(table), Some(embedder)) => (table, embedder),
            _ => {
                warn!("Vector index not available, returning empty results");
                return Ok(Vec::new());
            }
        };

        if k == 0 {
            return Ok(Vec::new());
        }

        let query_vec = embedder.embed_boxed(query).await?;
        let products: Vec<ProductRecord> = table
            .nearest(&query_vec, k)?
            .into_iter()
            .cloned()
            .collect();

        debug!(k, found = products.len(), "Semantic search complete");
        Ok(products)
    }
}
