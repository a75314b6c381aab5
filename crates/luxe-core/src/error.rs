use thiserror::Error;

/// Top-level error type for the Luxe recommendation service.
///
/// Covers startup loading (config, catalog, index, embedder) and serving.
/// Chat and generation failures have their own types in `luxe-chat`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LuxeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for LuxeError {
    fn from(err: toml::de::Error) -> Self {
        LuxeError::Config(err.to_string())
    }
}

/// A specialized `Result` type for Luxe operations.
pub type Result<T> = std::result::Result<T, LuxeError>;
