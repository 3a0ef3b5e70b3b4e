//! Ollama embedding client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use fuseq_core::{Embedder, EmbeddingConfig, FuseError, Result};

/// Embedder backed by the Ollama embeddings endpoint.
///
/// Prompts are truncated to the configured character budget before
/// being sent; embedding whole documents is the caller's problem, not
/// this client's.
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_chars: usize,
}

#[derive(Serialize)]
struct EmbedBody<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    /// Create an embedder from configuration.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| FuseError::embedding(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_chars: config.max_chars,
        })
    }

    /// Truncate on a char boundary to the configured budget.
    fn truncate<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.max_chars) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let body = EmbedBody {
            model: &self.model,
            prompt: self.truncate(text),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FuseError::embedding(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FuseError::embedding(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| FuseError::embedding(e.to_string()))?;

        if parsed.embedding.is_empty() {
            return Err(FuseError::embedding("empty embedding in response"));
        }

        Ok(parsed.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: &str) -> EmbeddingConfig {
        EmbeddingConfig {
            url: url.to_string(),
            model: "nomic-embed-text".to_string(),
            timeout_ms: 5000,
            max_chars: 2000,
            embed_for_rerank: true,
        }
    }

    #[tokio::test]
    async fn test_embed_parses_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_partial_json(serde_json::json!({
                "model": "nomic-embed-text",
                "prompt": "rust"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embedding": [0.1, 0.2, 0.3]
            })))
            .mount(&server)
            .await;

        let embedder = OllamaEmbedder::new(&config(&server.uri())).unwrap();
        let vector = embedder.embed("rust").await.unwrap();

        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_empty_embedding_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"embedding": []})),
            )
            .mount(&server)
            .await;

        let embedder = OllamaEmbedder::new(&config(&server.uri())).unwrap();
        let err = embedder.embed("rust").await.unwrap_err();

        assert_eq!(err.error_code(), "EMBEDDING_ERROR");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let mut cfg = config("http://localhost:11434");
        cfg.max_chars = 3;
        let embedder = OllamaEmbedder::new(&cfg).unwrap();

        assert_eq!(embedder.truncate("héllo"), "hél");
        assert_eq!(embedder.truncate("ab"), "ab");
    }
}
