//! Embedding service trait and implementations.
//!
//! - `OnnxEmbeddingService` runs the all-MiniLM-L6-v2 sentence-transformer
//!   (or any compatible ONNX export) via ort, tokenizing with the
//!   HuggingFace tokenizers crate. This is the production query embedder and
//!   must match the model the offline index build used.
//! - `MockEmbedding` provides deterministic hash-based vectors for testing.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::{Arc, Mutex};

use luxe_core::error::LuxeError;
use ort::session::Session;
use ort::value::TensorRef;
use tokenizers::Tokenizer;
use tracing::info;

/// Output width of all-MiniLM-L6-v2.
pub const MINILM_DIMENSIONS: usize = 384;

/// Service for generating text embeddings.
///
/// Implementations convert text into fixed-dimensional vectors in the same
/// similarity space as the product index.
pub trait EmbeddingService: Send + Sync {
    /// Generate an embedding vector for the given text.
    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, LuxeError>> + Send;

    /// Return the dimensionality of vectors produced by this service.
    fn dimensions(&self) -> usize;
}

/// Object-safe version of [`EmbeddingService`] for dynamic dispatch.
///
/// `EmbeddingService::embed` returns `impl Future` and is therefore not
/// object-safe. This trait boxes the future so the retrieval engine can hold a
/// `Box<dyn DynEmbeddingService>` without being generic over the backend.
pub trait DynEmbeddingService: Send + Sync {
    /// Generate an embedding vector for the given text (boxed future).
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>, LuxeError>> + Send + 'a>>;

    /// Return the dimensionality of vectors produced by this service.
    fn dimensions(&self) -> usize;
}

impl<T: EmbeddingService> DynEmbeddingService for T {
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>, LuxeError>> + Send + 'a>> {
        Box::pin(self.embed(text))
    }

    fn dimensions(&self) -> usize {
        EmbeddingService::dimensions(self)
    }
}

// ---------------------------------------------------------------------------
// OnnxEmbeddingService
// ---------------------------------------------------------------------------

/// ONNX Runtime sentence-transformer embedder.
///
/// Loads `model.onnx` and `tokenizer.json` from one directory. Token
/// embeddings are mean-pooled under the attention mask and L2-normalized,
/// which is what sentence-transformers does for all-MiniLM-L6-v2.
#[derive(Clone)]
pub struct OnnxEmbeddingService {
    model: Arc<OnnxModel>,
    dimensions: usize,
}

struct OnnxModel {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl std::fmt::Debug for OnnxEmbeddingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingService")
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

fn embedding_err<E: std::fmt::Display>(stage: &'static str) -> impl Fn(E) -> LuxeError {
    move |e| LuxeError::Embedding(format!("{}: {}", stage, e))
}

impl OnnxEmbeddingService {
    pub fn from_directory(model_dir: &Path) -> Result<Self, LuxeError> {
        Self::from_files(
            &model_dir.join("model.onnx"),
            &model_dir.join("tokenizer.json"),
        )
    }

    pub fn from_files(model_path: &Path, tokenizer_path: &Path) -> Result<Self, LuxeError> {
        for (what, path) in [("ONNX model", model_path), ("Tokenizer", tokenizer_path)] {
            if !path.exists() {
                return Err(LuxeError::Embedding(format!(
                    "{} not found at {}",
                    what,
                    path.display()
                )));
            }
        }

        let session = Session::builder()
            .map_err(embedding_err("ONNX session builder"))?
            .with_intra_threads(1)
            .map_err(embedding_err("ONNX set threads"))?
            .commit_from_file(model_path)
            .map_err(embedding_err("ONNX load model"))?;

        // Output shape is [batch, tokens, hidden]; -1 marks a dynamic axis.
        let dimensions = session
            .outputs()
            .first()
            .and_then(|out| out.dtype().tensor_shape())
            .and_then(|shape| shape.last().copied())
            .filter(|&d| d > 0)
            .map_or(MINILM_DIMENSIONS, |d| d as usize);

        let tokenizer =
            Tokenizer::from_file(tokenizer_path).map_err(embedding_err("Load tokenizer"))?;

        info!(model = %model_path.display(), dimensions, "Loaded ONNX embedding model");

        Ok(Self {
            model: Arc::new(OnnxModel {
                session: Mutex::new(session),
                tokenizer,
            }),
            dimensions,
        })
    }
}

impl OnnxModel {
    /// Tokenize, run one forward pass, and pool to a sentence vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>, LuxeError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(embedding_err("Tokenization"))?;

        let widen = |xs: &[u32]| xs.iter().map(|&x| i64::from(x)).collect::<Vec<i64>>();
        let mask = widen(encoding.get_attention_mask());
        let tokens = mask.len();

        let ids = ndarray::Array2::from_shape_vec((1, tokens), widen(encoding.get_ids()))
            .map_err(embedding_err("input_ids"))?;
        let attention = ndarray::Array2::from_shape_vec((1, tokens), mask.clone())
            .map_err(embedding_err("attention_mask"))?;
        let type_ids = ndarray::Array2::from_shape_vec((1, tokens), widen(encoding.get_type_ids()))
            .map_err(embedding_err("token_type_ids"))?;

        let inputs = ort::inputs![
            TensorRef::from_array_view(&ids).map_err(embedding_err("input_ids tensor"))?,
            TensorRef::from_array_view(&attention).map_err(embedding_err("attention_mask tensor"))?,
            TensorRef::from_array_view(&type_ids).map_err(embedding_err("token_type_ids tensor"))?
        ];

        let mut session = self
            .session
            .lock()
            .map_err(|e| LuxeError::Embedding(format!("Session lock poisoned: {}", e)))?;
        let outputs = session.run(inputs).map_err(embedding_err("ONNX inference"))?;
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(embedding_err("Extract embeddings"))?;

        let hidden = match shape.iter().copied().collect::<Vec<i64>>().as_slice() {
            [.., _, last] if *last > 0 => *last as usize,
            other => {
                return Err(LuxeError::Embedding(format!(
                    "Unexpected output shape: {:?}",
                    other
                )))
            }
        };

        let mut pooled = mean_pool(data, &mask, hidden);
        l2_normalize(&mut pooled);
        Ok(pooled)
    }
}

/// Average the token rows of `data` whose mask entry is set.
fn mean_pool(data: &[f32], mask: &[i64], hidden: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; hidden];
    let mut count = 0usize;
    for (row, _) in data
        .chunks_exact(hidden)
        .zip(mask)
        .filter(|&(_, &m)| m > 0)
    {
        for (acc, v) in pooled.iter_mut().zip(row) {
            *acc += v;
        }
        count += 1;
    }
    if count > 0 {
        pooled.iter_mut().for_each(|v| *v /= count as f32);
    }
    pooled
}

impl EmbeddingService for OnnxEmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LuxeError> {
        let model = Arc::clone(&self.model);
        let text = text.to_string();
        tokio::task::spawn_blocking(move || model.embed(&text))
            .await
            .map_err(embedding_err("Embedding task"))?
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ---------------------------------------------------------------------------
// MockEmbedding
// ---------------------------------------------------------------------------

/// Mock embedding service that returns deterministic unit vectors.
///
/// The output is derived from a hash of the input text, so identical inputs
/// always produce identical outputs. Tests build indexes from the same mock
/// so a query equal to a product's indexed text lands at distance zero.
#[derive(Debug, Clone)]
pub struct MockEmbedding {
    dimensions: usize,
}

impl MockEmbedding {
    pub fn new() -> Self {
        Self::with_dimensions(MINILM_DIMENSIONS)
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Synchronous embedding, handy for building fixture indexes.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut result = Vec::with_capacity(self.dimensions);
        for i in 0..self.dimensions {
            let mut hasher = DefaultHasher::new();
            text.hash(&mut hasher);
            i.hash(&mut hasher);
            let h = hasher.finish();
            let val = ((h as f64) / (u64::MAX as f64)) * 2.0 - 1.0;
            result.push(val as f32);
        }
        l2_normalize(&mut result);
        result
    }
}

impl Default for MockEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingService for MockEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LuxeError> {
        Ok(self.vector_for(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn l2_normalize(values: &mut [f32]) {
    let norm: f32 = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in values.iter_mut() {
            *val /= norm;
        }
    }
}
