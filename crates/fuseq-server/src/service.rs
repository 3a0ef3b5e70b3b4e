//! Query service wiring.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use fuseq_core::{Embedder, FuseConfig, QueryRequest, QueryResponse, Result};
use fuseq_query::{build_strategy, QueryEngine};
use fuseq_source::{MeiliSource, OllamaEmbedder, QdrantSource};

/// The assembled query service: configured adapters behind one engine.
pub struct QueryService {
    engine: Arc<QueryEngine>,
    config: FuseConfig,
}

impl QueryService {
    /// Wire the Qdrant + Meilisearch adapters and the Ollama embedder
    /// from configuration.
    pub fn from_config(config: FuseConfig) -> Result<Self> {
        info!(
            "Initializing query service (vector: {}, lexical: {})",
            config.sources.vector.url, config.sources.lexical.url
        );

        let embedder: Arc<dyn Embedder> = Arc::new(OllamaEmbedder::new(&config.embedding)?);
        let vector = Arc::new(QdrantSource::new(&config.sources.vector, embedder.clone()));
        let lexical = Arc::new(MeiliSource::new(&config.sources.lexical));

        let strategy = build_strategy(&config.search);
        let timeout = Duration::from_millis(config.sources.timeout_ms);

        let mut engine = QueryEngine::new(
            vec![vector, lexical],
            strategy,
            config.search.clone(),
            timeout,
        );
        if config.embedding.embed_for_rerank {
            engine = engine.with_embedder(embedder);
        }

        Ok(Self {
            engine: Arc::new(engine),
            config,
        })
    }

    /// Build a service around an already-wired engine.
    ///
    /// Lets tests and embedders-in-a-box swap in their own sources.
    pub fn with_engine(engine: QueryEngine, config: FuseConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            config,
        }
    }

    /// Answer a query.
    pub async fn search(&self, request: &QueryRequest) -> Result<QueryResponse> {
        self.engine.search(request).await
    }

    /// Configured bind address for the HTTP server.
    pub fn bind_address(&self) -> &str {
        &self.config.server.bind
    }
}
