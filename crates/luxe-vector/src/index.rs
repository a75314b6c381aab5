//! Flat nearest-neighbour index over product embeddings.
//!
//! Vectors are addressed by position: entry `i` belongs to catalog entry `i`.
//! Search is an exhaustive squared-L2 scan, which reproduces a flat L2 index
//! exactly and is fast enough for catalog-sized collections.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use luxe_core::error::LuxeError;

/// A single hit returned from a vector search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexHit {
    /// Catalog position of the matching vector.
    pub position: usize,
    /// Squared Euclidean distance to the query (lower is closer).
    pub distance: f32,
}

/// On-disk layout written by the offline index build.
#[derive(Debug, Deserialize)]
struct IndexFile {
    dimensions: usize,
    vectors: Vec<Vec<f32>>,
}

/// Read-only positional vector index.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimensions: usize,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Build an index from vectors in catalog order.
    ///
    /// Every vector must have exactly `dimensions` components.
    pub fn from_vectors(dimensions: usize, vectors: Vec<Vec<f32>>) -> Result<Self, LuxeError> {
        if dimensions == 0 {
            return Err(LuxeError::Index("dimensions must be positive".to_string()));
        }
        if let Some((pos, bad)) = vectors
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != dimensions)
        {
            return Err(LuxeError::Index(format!(
                "vector {} has {} dimensions, expected {}",
                pos,
                bad.len(),
                dimensions
            )));
        }
        Ok(Self { dimensions, vectors })
    }

    /// Load an index file produced by the offline build step.
    pub fn load(path: &Path) -> Result<Self, LuxeError> {
        let content = std::fs::read_to_string(path)?;
        let file: IndexFile = serde_json::from_str(&content)
            .map_err(|e| LuxeError::Index(format!("{}: {}", path.display(), e)))?;
        let index = Self::from_vectors(file.dimensions, file.vectors)?;
        info!(
            path = %path.display(),
            entries = index.len(),
            dimensions = index.dimensions,
            "Vector index loaded"
        );
        Ok(index)
    }

    /// Return the `k` positions nearest to `query`, closest first.
    ///
    /// Equal distances keep the lower position first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<IndexHit>, LuxeError> {
        if query.len() != self.dimensions {
            return Err(LuxeError::Index(format!(
                "query has {} dimensions, index has {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut hits: Vec<IndexHit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, v)| IndexHit {
                position,
                distance: squared_l2(query, v),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(k);
        Ok(hits)
    }

    /// Keep only the first `len` entries.
    pub fn truncate(&mut self, len: usize) {
        self.vectors.truncate(len);
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
