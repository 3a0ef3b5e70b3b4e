//! Meilisearch lexical index adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use fuseq_core::{
    Candidate, CandidateSource, FuseError, LexicalSourceConfig, RankedList, Result, SourceKind,
};

/// Candidate source backed by a Meilisearch index search.
///
/// Meilisearch orders hits by relevance but exposes no comparable
/// score, so the adapter synthesizes the positional score `1/(i+1)`.
/// That score is only ever interpreted within this source.
pub struct MeiliSource {
    client: reqwest::Client,
    base_url: String,
    index: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct SearchBody<'a> {
    q: &'a str,
    limit: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<serde_json::Map<String, Value>>,
}

impl MeiliSource {
    /// Create an adapter from configuration.
    pub fn new(config: &LexicalSourceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            index: config.index.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn doc_id(hit: &serde_json::Map<String, Value>, position: usize) -> String {
        for key in ["doc_id", "id"] {
            match hit.get(key) {
                Some(Value::String(s)) => return s.clone(),
                Some(Value::Number(n)) => return n.to_string(),
                _ => {}
            }
        }
        format!("meili_{}", position)
    }

    fn text(hit: &serde_json::Map<String, Value>) -> Option<&str> {
        hit.get("text")
            .and_then(Value::as_str)
            .or_else(|| hit.get("content").and_then(Value::as_str))
    }
}

#[async_trait]
impl CandidateSource for MeiliSource {
    fn name(&self) -> &str {
        "meili"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Lexical
    }

    async fn fetch(&self, query: &str, top_n: usize) -> Result<RankedList> {
        let url = format!("{}/indexes/{}/search", self.base_url, self.index);
        let body = SearchBody {
            q: query,
            limit: top_n,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("X-Meili-API-Key", key);
        }

        let response = request
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

        debug!("meili returned {} hits", parsed.hits.len());

        let candidates = parsed
            .hits
            .iter()
            .enumerate()
            .map(|(i, hit)| {
                let score = 1.0 / (i as f32 + 1.0);
                let mut candidate = Candidate::new(Self::doc_id(hit, i), score, self.kind());
                if let Some(text) = Self::text(hit) {
                    candidate = candidate.with_text(text);
                }
                candidate
            })
            .collect();

        Ok(RankedList::new(self.name(), self.kind(), candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: &str, api_key: Option<&str>) -> LexicalSourceConfig {
        LexicalSourceConfig {
            url: url.to_string(),
            index: "docs".to_string(),
            api_key: api_key.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_fetch_synthesizes_positional_scores() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexes/docs/search"))
            .and(header("X-Meili-API-Key", "meili_key"))
            .and(body_partial_json(
                serde_json::json!({"q": "rust", "limit": 3}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hits": [
                    {"doc_id": "doc-a", "text": "alpha"},
                    {"id": 42, "content": "beta"},
                    {"title": "no id at all"}
                ]
            })))
            .mount(&server)
            .await;

        let source = MeiliSource::new(&config(&server.uri(), Some("meili_key")));
        let list = source.fetch("rust", 3).await.unwrap();

        assert_eq!(list.len(), 3);
        assert_eq!(list.candidates[0].doc_id, "doc-a");
        assert_eq!(list.candidates[0].score, 1.0);
        assert_eq!(list.candidates[0].text.as_deref(), Some("alpha"));
        assert_eq!(list.candidates[1].doc_id, "42");
        assert_eq!(list.candidates[1].score, 0.5);
        assert_eq!(list.candidates[1].text.as_deref(), Some("beta"));
        assert_eq!(list.candidates[2].doc_id, "meili_2");
    }

    #[tokio::test]
    async fn test_no_api_key_sends_no_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexes/docs/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"hits": []})),
            )
            .mount(&server)
            .await;

        let source = MeiliSource::new(&config(&server.uri(), None));
        let list = source.fetch("rust", 3).await.unwrap();

        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_http_error_maps_to_source_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexes/docs/search"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let source = MeiliSource::new(&config(&server.uri(), None));
        let err = source.fetch("rust", 3).await.unwrap_err();

        assert_eq!(err.error_code(), "SOURCE_UNAVAILABLE");
        assert!(err.to_string().contains("403"));
    }
}
