//! Product catalog and its positional pairing with the vector index.

use std::path::Path;

use tracing::{error, info, warn};

use luxe_core::error::LuxeError;
use luxe_core::types::ProductRecord;

use crate::index::{IndexHit, VectorIndex};

/// Ordered, read-only collection of product records.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    products: Vec<ProductRecord>,
}

impl CatalogStore {
    pub fn new(products: Vec<ProductRecord>) -> Self {
        Self { products }
    }

    /// Load a JSON array of product records.
    pub fn load(path: &Path) -> Result<Self, LuxeError> {
        let content = std::fs::read_to_string(path)?;
        let products: Vec<ProductRecord> = serde_json::from_str(&content)
            .map_err(|e| LuxeError::Catalog(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Loaded {} products", products.len());
        Ok(Self { products })
    }

    /// Load the catalog, falling back to an empty one when the file is
    /// missing or unreadable.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Product catalog unavailable");
                Self::default()
            }
        }
    }

    pub fn get(&self, position: usize) -> Option<&ProductRecord> {
        self.products.get(position)
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Catalog records paired one-to-one with their index vectors.
///
/// Construction trims both sides to their common length, so every index
/// position resolves to exactly one record.
#[derive(Debug, Clone)]
pub struct ProductTable {
    records: Vec<ProductRecord>,
    index: VectorIndex,
}

impl ProductTable {
    /// Pair a catalog with the index built from it.
    pub fn pair(catalog: &CatalogStore, mut index: VectorIndex) -> Self {
        let paired = catalog.len().min(index.len());
        if catalog.len() != index.len() {
            warn!(
                catalog_len = catalog.len(),
                index_len = index.len(),
                paired,
                "Catalog and vector index lengths differ; unpaired entries are unreachable"
            );
        }
        index.truncate(paired);
        Self {
            records: catalog.products()[..paired].to_vec(),
            index,
        }
    }

    /// The `k` records nearest to `query`, closest first.
    pub fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<&ProductRecord>, LuxeError> {
        let hits = self.index.search(query, k)?;
        Ok(hits
            .iter()
            .filter_map(|IndexHit { position, .. }| self.records.get(*position))
            .collect())
    }

    pub fn dimensions(&self) -> usize {
        self.index.dimensions()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
