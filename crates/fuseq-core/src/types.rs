//! Core domain types for the hybrid query engine.
//!
//! Everything here is created fresh per query and discarded once the
//! response is returned; nothing is shared between queries.

use serde::{Deserialize, Serialize};

/// Which backing index produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Vector similarity index (embedding search).
    Vector,
    /// Lexical full-text index (keyword search).
    Lexical,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vector => write!(f, "vector"),
            Self::Lexical => write!(f, "lexical"),
        }
    }
}

/// A search request as received on the wire, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Raw query text.
    pub q: String,

    /// Number of results to return (defaults from config).
    pub k: Option<usize>,

    /// Diversity factor in [0, 1]: 0 = pure relevance, 1 = pure diversity.
    /// Absent disables the rerank pass entirely.
    pub mmr: Option<f32>,
}

impl QueryRequest {
    /// Create a request with just query text.
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            k: None,
            mmr: None,
        }
    }

    /// Set the result count.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    /// Set the diversity factor.
    pub fn with_mmr(mut self, mmr: f32) -> Self {
        self.mmr = Some(mmr);
        self
    }
}

/// One retrieval hit from a single source.
///
/// Raw scores are source-specific and never comparable across sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Opaque document identifier, unique within a collection.
    pub doc_id: String,

    /// Raw score on the source's own scale.
    pub score: f32,

    /// Which kind of index produced this hit.
    pub source: SourceKind,

    /// Text snippet, when the source returns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Embedding for diversity comparison, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Candidate {
    /// Create a candidate without a text or embedding payload.
    pub fn new(doc_id: impl Into<String>, score: f32, source: SourceKind) -> Self {
        Self {
            doc_id: doc_id.into(),
            score,
            source,
            text: None,
            embedding: None,
        }
    }

    /// Attach a text snippet.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Attach an embedding.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// An ordered result list from one source.
///
/// Rank is implied by position (first = rank 1). Invariant: no duplicate
/// document identifiers within one list.
#[derive(Debug, Clone)]
pub struct RankedList {
    /// Adapter name, e.g. "qdrant".
    pub source: String,

    /// Kind of backing index.
    pub kind: SourceKind,

    /// Candidates, best first, in the order the backing index returned them.
    pub candidates: Vec<Candidate>,
}

impl RankedList {
    /// Create a ranked list, dropping repeated document ids.
    ///
    /// The first (best-ranked) occurrence of each id is kept.
    pub fn new(source: impl Into<String>, kind: SourceKind, candidates: Vec<Candidate>) -> Self {
        let mut list = Self {
            source: source.into(),
            kind,
            candidates,
        };
        list.dedup();
        list
    }

    /// Drop repeated document ids, keeping the best-ranked occurrence.
    pub fn dedup(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.candidates.retain(|c| seen.insert(c.doc_id.clone()));
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Per-source contribution to a fused entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceContribution {
    /// Adapter name.
    pub source: String,

    /// Kind of backing index.
    pub kind: SourceKind,

    /// 1-based rank within that source's list.
    pub rank: usize,

    /// Raw score from that source.
    pub raw_score: f32,
}

/// A document after rank fusion.
///
/// The fused score is dimensionless and comparable only within one
/// fusion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedEntry {
    /// Document identifier.
    pub doc_id: String,

    /// Weighted RRF score.
    pub fused_score: f32,

    /// Which sources contributed, with their ranks and raw scores.
    pub contributions: Vec<SourceContribution>,

    /// Carried text representation for the diversity pass.
    #[serde(skip)]
    pub text: Option<String>,

    /// Carried embedding representation for the diversity pass.
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
}

impl FusedEntry {
    /// Number of sources this document appeared in.
    pub fn source_count(&self) -> usize {
        self.contributions.len()
    }

    /// Best (lowest) rank across contributing sources.
    pub fn best_rank(&self) -> usize {
        self.contributions
            .iter()
            .map(|c| c.rank)
            .min()
            .unwrap_or(usize::MAX)
    }
}

/// A single entry in the final response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result rank (1-indexed).
    pub rank: usize,

    /// Document identifier.
    pub doc_id: String,

    /// Final score: fused score, or MMR score if reranking ran.
    pub score: f32,

    /// Text snippet, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Per-source outcome recorded in the explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReport {
    /// Adapter name.
    pub source: String,

    /// Kind of backing index.
    pub kind: SourceKind,

    /// How many candidates were requested.
    pub requested: usize,

    /// How many candidates came back (0 for a failed source).
    pub returned: usize,

    /// Fusion weight applied to this source.
    pub weight: f32,

    /// Failure reason, for a source that was unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Rerank details for one returned document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankTrace {
    /// MMR score at the iteration this document was selected.
    pub mmr_score: f32,

    /// Greedy selection iteration (0-based).
    pub iteration: usize,

    /// True when this document had no embedding and similarity fell back
    /// to lexical token overlap.
    pub fallback_similarity: bool,
}

/// Full trace for one returned document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultTrace {
    /// Document identifier.
    pub doc_id: String,

    /// Final position (1-indexed).
    pub position: usize,

    /// Fused RRF score.
    pub fused_score: f32,

    /// Per-source ranks and raw scores.
    pub contributions: Vec<SourceContribution>,

    /// Diversity pass details, when reranking ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank: Option<RerankTrace>,
}

/// Explanation payload attached 1:1 to a response.
///
/// Purely observational; never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    /// True when at least one source failed and the query proceeded on
    /// the survivors.
    pub degraded: bool,

    /// RRF smoothing constant used.
    pub rrf_k: f32,

    /// Name of the weight strategy that produced the fusion weights.
    pub weight_strategy: String,

    /// True when the diversity pass ran.
    pub reranked: bool,

    /// Diversity factor the rerank ran with, if it ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diversity: Option<f32>,

    /// Per-source outcomes.
    pub sources: Vec<SourceReport>,

    /// Per-result traces, in final order.
    pub results: Vec<ResultTrace>,
}

/// Query response: final ranked results plus the explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The original query text.
    pub query: String,

    /// Total results returned.
    pub total_results: usize,

    /// End-to-end latency in milliseconds.
    pub latency_ms: u64,

    /// Final ranked results.
    pub results: Vec<SearchHit>,

    /// Explanation trace.
    pub explain: Explanation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_list_dedup_keeps_best_rank() {
        let list = RankedList::new(
            "qdrant",
            SourceKind::Vector,
            vec![
                Candidate::new("a", 0.9, SourceKind::Vector),
                Candidate::new("b", 0.8, SourceKind::Vector),
                Candidate::new("a", 0.7, SourceKind::Vector),
            ],
        );

        assert_eq!(list.len(), 2);
        assert_eq!(list.candidates[0].doc_id, "a");
        assert_eq!(list.candidates[0].score, 0.9);
        assert_eq!(list.candidates[1].doc_id, "b");
    }

    #[test]
    fn test_fused_entry_best_rank() {
        let entry = FusedEntry {
            doc_id: "a".to_string(),
            fused_score: 0.1,
            contributions: vec![
                SourceContribution {
                    source: "qdrant".to_string(),
                    kind: SourceKind::Vector,
                    rank: 3,
                    raw_score: 0.7,
                },
                SourceContribution {
                    source: "meili".to_string(),
                    kind: SourceKind::Lexical,
                    rank: 1,
                    raw_score: 1.0,
                },
            ],
            text: None,
            embedding: None,
        };

        assert_eq!(entry.source_count(), 2);
        assert_eq!(entry.best_rank(), 1);
    }

    #[test]
    fn test_query_request_builder() {
        let req = QueryRequest::new("rust async").with_k(5).with_mmr(0.3);
        assert_eq!(req.q, "rust async");
        assert_eq!(req.k, Some(5));
        assert_eq!(req.mmr, Some(0.3));
    }
}
