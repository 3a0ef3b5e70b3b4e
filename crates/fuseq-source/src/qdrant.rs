//! Qdrant vector index adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use fuseq_core::{
    Candidate, CandidateSource, Embedder, FuseError, RankedList, Result, SourceKind,
    VectorSourceConfig,
};

/// Candidate source backed by a Qdrant points search.
///
/// The query text is embedded first, then searched against the
/// configured collection. With `with_vectors` enabled, hits carry their
/// stored embeddings so the diversity pass can compare them directly.
pub struct QdrantSource {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    with_vectors: bool,
    embedder: Arc<dyn Embedder>,
}

#[derive(Serialize)]
struct SearchBody<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
    with_vector: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    id: Value,
    score: f32,
    #[serde(default)]
    payload: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    vector: Option<Vec<f32>>,
}

impl QdrantSource {
    /// Create an adapter from configuration.
    pub fn new(config: &VectorSourceConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            with_vectors: config.with_vectors,
            embedder,
        }
    }

    fn doc_id(point: &ScoredPoint) -> String {
        point
            .payload
            .as_ref()
            .and_then(|p| p.get("doc_id"))
            .and_then(value_as_string)
            .unwrap_or_else(|| value_as_string(&point.id).unwrap_or_else(|| point.id.to_string()))
    }
}

/// Render a JSON scalar as a plain string (no quotes around strings).
fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl CandidateSource for QdrantSource {
    fn name(&self) -> &str {
        "qdrant"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Vector
    }

    async fn fetch(&self, query: &str, top_n: usize) -> Result<RankedList> {
        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| FuseError::source_unavailable(self.name(), e.to_string()))?;

        let url = format!(
            "{}/collections/{}/points/search",
            self.base_url, self.collection
        );
        let body = SearchBody {
            vector: &vector,
            limit: top_n,
            with_payload: true,
            with_vector: self.with_vectors,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FuseError::source_unavailable(self.name(), e.to_string()))?;

        if !response.status().is_success() {
            return Err(FuseError::source_unavailable(
                self.name(),
                format!("HTTP {}", response.status()),
            ));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| FuseError::source_unavailable(self.name(), e.to_string()))?;

        debug!("qdrant returned {} points", parsed.result.len());

        let candidates = parsed
            .result
            .iter()
            .map(|point| {
                let mut candidate = Candidate::new(Self::doc_id(point), point.score, self.kind());
                if let Some(text) = point
                    .payload
                    .as_ref()
                    .and_then(|p| p.get("text"))
                    .and_then(Value::as_str)
                {
                    candidate = candidate.with_text(text);
                }
                if let Some(vector) = &point.vector {
                    candidate = candidate.with_embedding(vector.clone());
                }
                candidate
            })
            .collect();

        Ok(RankedList::new(self.name(), self.kind(), candidates))
    }
}
