use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// Default Gemini REST endpoint.
pub const DEFAULT_LLM_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Top-level configuration for the Luxe recommendation service.
///
/// Loaded from `luxe.toml` (or the file named by `LUXE_CONFIG`) by default. Every section falls back to
/// its defaults when omitted, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LuxeConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
}

impl LuxeConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LuxeConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }
}

/// General service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// HTTP listen port.
    pub port: u16,
    /// HTTP bind address.
    pub bind_address: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            bind_address: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Locations of the offline-built catalog and vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON array of product records.
    pub products_path: String,
    /// JSON vector index whose entry order matches the catalog.
    pub index_path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            products_path: "products.json".to_string(),
            index_path: "product_index.json".to_string(),
        }
    }
}

/// Sentence-embedding model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Directory holding `model.onnx` and `tokenizer.json`.
    pub model_dir: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_dir: "models/all-MiniLM-L6-v2".to_string(),
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of products retrieved per chat message.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 2 }
    }
}

/// Text-generation collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API credential. Usually supplied via `GOOGLE_GEMINI_API_KEY` instead.
    pub api_key: String,
    /// Model identifier, with or without the `models/` prefix.
    pub model: String,
    /// REST endpoint base URL.
    pub api_base: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub candidate_count: u32,
    /// HTTP timeout for one generation call, in seconds.
    pub timeout_secs: u64,
    /// Extra attempts after a retryable failure (transport, 429, 5xx).
    pub max_retries: u32,
}

impl LlmConfig {
    /// Whether a non-blank credential is present.
    pub fn api_key_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "models/gemini-2.5-flash".to_string(),
            api_base: DEFAULT_LLM_API_BASE.to_string(),
            temperature: 0.7,
            top_p: 0.95,
            max_output_tokens: 500,
            candidate_count: 1,
            timeout_secs: 60,
            max_retries: 0,
        }
    }
}

/// Conversation history retention.
///
/// Both limits are disabled by default: history grows for the process
/// lifetime and never expires.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Maximum turns kept per user (0 = unbounded). Oldest turns are dropped.
    pub max_turns: usize,
    /// Minutes of inactivity after which a history is discarded (0 = never).
    pub idle_timeout_minutes: u32,
}
