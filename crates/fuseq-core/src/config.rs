//! Configuration types for the fuseq query engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the query engine and its adapters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FuseConfig {
    /// Search and fusion configuration.
    #[serde(default)]
    pub search: SearchConfig,

    /// Candidate source configuration.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Embedding service configuration.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Which adaptive weight strategy the fusion engine uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightStrategyKind {
    /// Weight sources by the spread of their normalized score
    /// distributions (more discriminating source = more weight).
    ScoreSpread,

    /// Boost the lexical source on short queries and the vector source
    /// on long ones.
    QueryLength,

    /// Static per-kind weights from `fixed_weights`.
    Fixed,
}

/// Search and fusion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default number of results when the request omits `k`.
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Maximum number of results.
    #[serde(default = "default_max_k")]
    pub max_k: usize,

    /// RRF smoothing constant.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: f32,

    /// Per-source fetch floor; actual fetch is max(2k, fetch_top_n) to
    /// leave headroom for fusion and reranking.
    #[serde(default = "default_fetch_top_n")]
    pub fetch_top_n: usize,

    /// Maximum candidate pool handed to the diversity reranker.
    #[serde(default = "default_rerank_pool")]
    pub rerank_pool: usize,

    /// Adaptive weight strategy.
    #[serde(default = "default_weight_strategy")]
    pub weight_strategy: WeightStrategyKind,

    /// Static weights used by the `fixed` strategy.
    #[serde(default)]
    pub fixed_weights: FixedWeights,

    /// Thresholds used by the `query-length` strategy.
    #[serde(default)]
    pub heuristics: QueryLengthHeuristics,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            max_k: default_max_k(),
            rrf_k: default_rrf_k(),
            fetch_top_n: default_fetch_top_n(),
            rerank_pool: default_rerank_pool(),
            weight_strategy: default_weight_strategy(),
            fixed_weights: FixedWeights::default(),
            heuristics: QueryLengthHeuristics::default(),
        }
    }
}

/// Static per-kind fusion weights.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FixedWeights {
    /// Weight for the vector source.
    #[serde(default = "default_vector_weight")]
    pub vector: f32,

    /// Weight for the lexical source.
    #[serde(default = "default_lexical_weight")]
    pub lexical: f32,
}

impl Default for FixedWeights {
    fn default() -> Self {
        Self {
            vector: default_vector_weight(),
            lexical: default_lexical_weight(),
        }
    }
}

/// Thresholds for the query-length weight heuristic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QueryLengthHeuristics {
    /// Queries at or under this many characters count as short.
    #[serde(default = "default_short_query_chars")]
    pub short_query_chars: usize,

    /// Queries at or under this many whitespace tokens count as short.
    #[serde(default = "default_short_query_tokens")]
    pub short_query_tokens: usize,

    /// Lexical weight applied on short queries.
    #[serde(default = "default_short_boost")]
    pub boost_lexical_on_short: f32,

    /// Vector weight applied on long queries.
    #[serde(default = "default_short_boost")]
    pub boost_vector_on_long: f32,
}

impl Default for QueryLengthHeuristics {
    fn default() -> Self {
        Self {
            short_query_chars: default_short_query_chars(),
            short_query_tokens: default_short_query_tokens(),
            boost_lexical_on_short: default_short_boost(),
            boost_vector_on_long: default_short_boost(),
        }
    }
}

/// Candidate source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Per-adapter timeout in milliseconds.
    #[serde(default = "default_source_timeout")]
    pub timeout_ms: u64,

    /// Vector index adapter.
    #[serde(default)]
    pub vector: VectorSourceConfig,

    /// Lexical index adapter.
    #[serde(default)]
    pub lexical: LexicalSourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_source_timeout(),
            vector: VectorSourceConfig::default(),
            lexical: LexicalSourceConfig::default(),
        }
    }
}

/// Vector index (Qdrant) adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorSourceConfig {
    /// Base URL of the Qdrant instance.
    #[serde(default = "default_vector_url")]
    pub url: String,

    /// Collection to search.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Request stored vectors so candidates carry embeddings for the
    /// diversity pass.
    #[serde(default = "default_true")]
    pub with_vectors: bool,
}

impl Default for VectorSourceConfig {
    fn default() -> Self {
        Self {
            url: default_vector_url(),
            collection: default_collection(),
            with_vectors: true,
        }
    }
}

/// Lexical index (Meilisearch) adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalSourceConfig {
    /// Base URL of the Meilisearch instance.
    #[serde(default = "default_lexical_url")]
    pub url: String,

    /// Index to search.
    #[serde(default = "default_collection")]
    pub index: String,

    /// Master/API key, sent as `X-Meili-API-Key` when set.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for LexicalSourceConfig {
    fn default() -> Self {
        Self {
            url: default_lexical_url(),
            index: default_collection(),
            api_key: None,
        }
    }
}

/// Embedding service (Ollama) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding service.
    #[serde(default = "default_embedding_url")]
    pub url: String,

    /// Embedding model name.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Request timeout in milliseconds.
    #[serde(default = "default_embedding_timeout")]
    pub timeout_ms: u64,

    /// Prompts are truncated to this many characters before embedding.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Embed candidate texts that arrive without a vector before the
    /// diversity pass (otherwise similarity falls back to token overlap).
    #[serde(default = "default_true")]
    pub embed_for_rerank: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_embedding_model(),
            timeout_ms: default_embedding_timeout(),
            max_chars: default_max_chars(),
            embed_for_rerank: true,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the query server.
    #[serde(default = "default_bind_address")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
        }
    }
}

// Default value functions

fn default_true() -> bool {
    true
}

fn default_k() -> usize {
    5
}

fn default_max_k() -> usize {
    100
}

fn default_rrf_k() -> f32 {
    60.0
}

fn default_fetch_top_n() -> usize {
    20
}

fn default_rerank_pool() -> usize {
    10
}

fn default_weight_strategy() -> WeightStrategyKind {
    WeightStrategyKind::ScoreSpread
}

fn default_vector_weight() -> f32 {
    0.6
}

fn default_lexical_weight() -> f32 {
    0.4
}

fn default_short_query_chars() -> usize {
    20
}

fn default_short_query_tokens() -> usize {
    3
}

fn default_short_boost() -> f32 {
    0.7
}

fn default_source_timeout() -> u64 {
    30_000
}

fn default_vector_url() -> String {
    "http://localhost:6333".to_string()
}

fn default_lexical_url() -> String {
    "http://localhost:7700".to_string()
}

fn default_collection() -> String {
    "docs".to_string()
}

fn default_embedding_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_embedding_timeout() -> u64 {
    60_000
}

fn default_max_chars() -> usize {
    2000
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

impl FuseConfig {
    /// Load configuration from file.
    pub fn load(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| crate::error::FuseError::Config {
            message: format!("Failed to parse config: {}", e),
        })?;
        Ok(config)
    }

    /// Load configuration from default paths.
    pub fn load_default() -> crate::error::Result<Self> {
        // Try user config first
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("fuseq").join("config.toml");
            if user_config.exists() {
                return Self::load(&user_config);
            }
        }

        // Try local config
        let local_config = PathBuf::from("fuseq.toml");
        if local_config.exists() {
            return Self::load(&local_config);
        }

        // Return defaults
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = FuseConfig::default();
        assert_eq!(config.search.default_k, 5);
        assert_eq!(config.search.rrf_k, 60.0);
        assert_eq!(config.search.weight_strategy, WeightStrategyKind::ScoreSpread);
        assert_eq!(config.sources.vector.url, "http://localhost:6333");
        assert_eq!(config.sources.lexical.url, "http://localhost:7700");
        assert!(config.embedding.embed_for_rerank);
    }

    #[test]
    fn test_fixed_weights_default() {
        let weights = FixedWeights::default();
        assert!((weights.vector - 0.6).abs() < f32::EPSILON);
        assert!((weights.lexical - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[search]
default_k = 10
weight_strategy = "query-length"

[sources.lexical]
api_key = "meili_key"
"#
        )
        .unwrap();

        let config = FuseConfig::load(file.path()).unwrap();
        assert_eq!(config.search.default_k, 10);
        assert_eq!(config.search.weight_strategy, WeightStrategyKind::QueryLength);
        assert_eq!(config.sources.lexical.api_key.as_deref(), Some("meili_key"));
        // Untouched sections keep their defaults
        assert_eq!(config.search.rrf_k, 60.0);
        assert_eq!(config.sources.timeout_ms, 30_000);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml [[[").unwrap();

        let err = FuseConfig::load(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
