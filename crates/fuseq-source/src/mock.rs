//! Deterministic in-memory mocks for tests.

use async_trait::async_trait;

use fuseq_core::{
    Candidate, CandidateSource, Embedder, FuseError, RankedList, Result, SourceKind,
};

/// Candidate source returning a fixed list, or a forced failure.
pub struct StaticSource {
    name: String,
    kind: SourceKind,
    candidates: Vec<Candidate>,
    fail_reason: Option<String>,
}

impl StaticSource {
    /// A source that always returns the given candidates.
    pub fn new(name: impl Into<String>, kind: SourceKind, candidates: Vec<Candidate>) -> Self {
        Self {
            name: name.into(),
            kind,
            candidates,
            fail_reason: None,
        }
    }

    /// A source that always fails with `SourceUnavailable`.
    pub fn failing(name: impl Into<String>, kind: SourceKind, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            candidates: Vec::new(),
            fail_reason: Some(reason.into()),
        }
    }
}

#[async_trait]
impl CandidateSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self, _query: &str, top_n: usize) -> Result<RankedList> {
        if let Some(reason) = &self.fail_reason {
            return Err(FuseError::source_unavailable(&self.name, reason));
        }
        let mut candidates = self.candidates.clone();
        candidates.truncate(top_n);
        Ok(RankedList::new(&self.name, self.kind, candidates))
    }
}

/// Deterministic mock embedder producing hash-derived unit vectors.
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    /// Create a mock embedder with the default dimension.
    pub fn new() -> Self {
        Self { dimension: 16 }
    }

    /// Create a mock embedder with a custom dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        // Deterministic embedding based on text hash
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_add(b as u64));
        let mut embedding = vec![0.0f32; self.dimension];
        for (i, v) in embedding.iter_mut().enumerate() {
            *v = ((hash.wrapping_mul(i as u64 + 1)) as f32 % 1000.0) / 1000.0 - 0.5;
        }

        // L2 normalize
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut embedding {
                *x /= norm;
            }
        }

        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source_truncates() {
        let source = StaticSource::new(
            "qdrant",
            SourceKind::Vector,
            vec![
                Candidate::new("a", 0.9, SourceKind::Vector),
                Candidate::new("b", 0.8, SourceKind::Vector),
                Candidate::new("c", 0.7, SourceKind::Vector),
            ],
        );

        let list = source.fetch("anything", 2).await.unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.candidates[0].doc_id, "a");
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = StaticSource::failing("meili", SourceKind::Lexical, "index offline");

        let err = source.fetch("anything", 5).await.unwrap_err();

        assert_eq!(err.error_code(), "SOURCE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_mock_embedder_is_deterministic_and_normalized() {
        let embedder = MockEmbedder::new();

        let first = embedder.embed("hello world").await.unwrap();
        let second = embedder.embed("hello world").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 16);

        let norm: f32 = first.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);
    }
}
