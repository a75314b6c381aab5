//! Luxe application binary - composition root.
//!
//! 1. Load configuration from TOML and fold in CLI/env overrides
//! 2. Resolve the text-generation credential (fatal if missing)
//! 3. Load the product catalog, embedding index, and embedder, degrading
//!    to retrieval-disabled mode when any of them is unavailable
//! 4. Build the chat orchestrator
//! 5. Serve the HTTP API until Ctrl-C

mod cli;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use luxe_api::routes;
use luxe_api::state::AppState;
use luxe_chat::{ChatOrchestrator, ConversationStore, GeminiClient};
use luxe_core::config::LuxeConfig;
use luxe_core::error::LuxeError;
use luxe_core::types::HealthStatus;
use luxe_vector::{
    CatalogStore, DynEmbeddingService, OnnxEmbeddingService, ProductTable, RetrievalEngine,
    VectorIndex,
};

use cli::{CliArgs, API_KEY_ENV};

/// Resolves once Ctrl-C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining requests");
}

fn load_index(path: &Path) -> Option<VectorIndex> {
    match VectorIndex::load(path) {
        Ok(index) => Some(index),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Vector index not available, retrieval disabled");
            None
        }
    }
}

fn load_embedder(model_dir: &Path) -> Option<Box<dyn DynEmbeddingService>> {
    match OnnxEmbeddingService::from_directory(model_dir) {
        Ok(embedder) => {
            tracing::info!(path = %model_dir.display(), "Embedding model loaded");
            Some(Box::new(embedder))
        }
        Err(e) => {
            tracing::error!(path = %model_dir.display(), error = %e, "Embedding model not available, retrieval disabled");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Loaded before tracing so the file can choose the log level;
    // the outcome is logged once the subscriber is up.
    let config_file = args.resolve_config_path();
    let loaded = if config_file.exists() {
        LuxeConfig::load(&config_file).map(Some)
    } else {
        Ok(None)
    };
    let mut config = match &loaded {
        Ok(Some(c)) => c.clone(),
        _ => LuxeConfig::default(),
    };
    args.apply(&mut config);

    // Tracing. RUST_LOG wins over --log-level and the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Luxe v{}", env!("CARGO_PKG_VERSION"));
    match loaded {
        Ok(Some(_)) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Ok(None) => tracing::info!(path = %config_file.display(), "No config file, using defaults"),
        Err(e) => tracing::warn!(path = %config_file.display(), error = %e, "Failed to load config, using defaults"),
    }

    // Credential.
    if !config.llm.api_key_configured() {
        tracing::error!("{} not found in environment variables or config", API_KEY_ENV);
        return Err(LuxeError::Config(format!("{} is required", API_KEY_ENV)).into());
    }

    // Catalog, index, embedder.
    let catalog = CatalogStore::load_or_empty(Path::new(&config.catalog.products_path));
    let index = load_index(Path::new(&config.catalog.index_path));
    let embedder = load_embedder(Path::new(&config.embedding.model_dir));

    if let (Some(index), Some(embedder)) = (&index, &embedder) {
        if index.dimensions() != embedder.dimensions() {
            tracing::warn!(
                index = index.dimensions(),
                embedder = embedder.dimensions(),
                "Index and embedder dimensions differ, every search will return no products"
            );
        }
    }

    let health = HealthStatus {
        api_key_configured: true,
        products_loaded: !catalog.is_empty(),
        faiss_index_loaded: index.is_some(),
        embedder_loaded: embedder.is_some(),
    };
    tracing::info!(?health, "Readiness");

    let table = index.map(|index| Arc::new(ProductTable::pair(&catalog, index)));
    let retrieval = RetrievalEngine::from_parts(table, embedder);
    if !retrieval.is_enabled() {
        tracing::warn!("Running without product retrieval");
    }

    // Orchestrator.
    let llm = GeminiClient::new(&config.llm)?;
    tracing::info!(model = llm.model(), "Text generation client ready");

    let orchestrator = ChatOrchestrator::new(
        Arc::new(retrieval),
        Arc::new(ConversationStore::with_config(&config.conversation)),
        Arc::new(llm),
    )
    .with_top_k(config.retrieval.top_k);

    // API server.
    let state = AppState::new(orchestrator, health);
    routes::start_server(&config, state, shutdown_signal()).await?;

    tracing::info!("Luxe stopped");
    Ok(())
}
