//! CLI argument definitions for the Luxe service.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use luxe_core::config::LuxeConfig;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "LUXE_CONFIG";
/// Environment variable overriding the listen port.
pub const PORT_ENV: &str = "LUXE_PORT";
/// Environment variable holding the text-generation credential.
pub const API_KEY_ENV: &str = "GOOGLE_GEMINI_API_KEY";

const DEFAULT_CONFIG_FILE: &str = "luxe.toml";
const DEFAULT_PORT: u16 = 5000;

/// Luxe — conversational product recommendations for a fashion catalog.
#[derive(Parser, Debug)]
#[command(name = "luxe", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Product catalog JSON file.
    #[arg(long = "products")]
    pub products: Option<PathBuf>,

    /// Product embedding index JSON file.
    #[arg(long = "index")]
    pub index: Option<PathBuf>,

    /// Directory holding model.onnx and tokenizer.json.
    #[arg(long = "model-dir")]
    pub model_dir: Option<PathBuf>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > LUXE_CONFIG env var > ./luxe.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        pick_config_path(self.config.clone(), std::env::var(CONFIG_ENV).ok())
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > LUXE_PORT env var > config file value > 5000.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        pick_port(self.port, std::env::var(PORT_ENV).ok(), config_port)
    }

    /// Resolve the LLM credential.
    ///
    /// Priority: GOOGLE_GEMINI_API_KEY env var > config file value.
    pub fn resolve_api_key(&self, config_key: &str) -> String {
        pick_api_key(std::env::var(API_KEY_ENV).ok(), config_key)
    }

    /// Fold every override into the loaded configuration.
    pub fn apply(&self, config: &mut LuxeConfig) {
        config.general.port = self.resolve_port(config.general.port);
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(ref p) = self.products {
            config.catalog.products_path = p.to_string_lossy().to_string();
        }
        if let Some(ref p) = self.index {
            config.catalog.index_path = p.to_string_lossy().to_string();
        }
        if let Some(ref p) = self.model_dir {
            config.embedding.model_dir = p.to_string_lossy().to_string();
        }
        config.llm.api_key = self.resolve_api_key(&config.llm.api_key);
    }
}

fn pick_config_path(flag: Option<PathBuf>, env: Option<String>) -> PathBuf {
    flag.or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

fn pick_port(flag: Option<u16>, env: Option<String>, config_port: u16) -> u16 {
    if let Some(p) = flag {
        return p;
    }
    if let Some(p) = env.and_then(|v| v.parse::<u16>().ok()) {
        return p;
    }
    if config_port != 0 {
        return config_port;
    }
    DEFAULT_PORT
}

fn pick_api_key(env: Option<String>, config_key: &str) -> String {
    env.map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| config_key.trim().to_string())
}
