//! Query orchestrator for the hybrid fusion pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use fuseq_core::{
    CandidateSource, Embedder, Explanation, FuseError, FusedEntry, QueryRequest, QueryResponse,
    RerankTrace, Result, ResultTrace, SearchConfig, SearchHit, SourceReport,
};

use crate::fusion;
use crate::mmr;
use crate::weights::WeightStrategy;

/// Top-level query engine.
///
/// Dispatches all candidate sources concurrently, fuses their rankings
/// with weighted RRF, optionally applies the MMR diversity pass, and
/// assembles the response with its explanation trace. Holds no mutable
/// state; one instance serves concurrent queries.
pub struct QueryEngine {
    /// Candidate sources, queried concurrently.
    sources: Vec<Arc<dyn CandidateSource>>,

    /// Adaptive fusion weight strategy.
    strategy: Arc<dyn WeightStrategy>,

    /// Embedder used to fill missing representations before reranking.
    embedder: Option<Arc<dyn Embedder>>,

    /// Search configuration.
    config: SearchConfig,

    /// Per-source fetch timeout.
    source_timeout: Duration,
}

impl QueryEngine {
    /// Create a new query engine.
    pub fn new(
        sources: Vec<Arc<dyn CandidateSource>>,
        strategy: Arc<dyn WeightStrategy>,
        config: SearchConfig,
        source_timeout: Duration,
    ) -> Self {
        Self {
            sources,
            strategy,
            embedder: None,
            config,
            source_timeout,
        }
    }

    /// Attach an embedder for pre-rerank representation fill.
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Answer a query.
    ///
    /// Partial-failure policy: a failed or timed-out source is recorded
    /// in the explanation and the query proceeds on the survivors; the
    /// query only fails when every source is unavailable.
    pub async fn search(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let start = Instant::now();

        let text = request.q.trim();
        if text.is_empty() {
            return Err(FuseError::invalid_query("query text must not be empty"));
        }
        let k = match request.k {
            Some(0) => return Err(FuseError::invalid_query("k must be at least 1")),
            Some(k) => k.min(self.config.max_k),
            None => self.config.default_k,
        };
        if let Some(d) = request.mmr {
            if !(0.0..=1.0).contains(&d) {
                return Err(FuseError::invalid_query(format!(
                    "mmr must lie in [0, 1], got {}",
                    d
                )));
            }
        }

        info!("Searching for: {:?}", text);

        // Fetch more than k per source to leave headroom for fusion and
        // the diversity pass.
        let fetch_n = (k * 2).max(self.config.fetch_top_n);

        let fetches = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            async move {
                let outcome = match timeout(self.source_timeout, source.fetch(text, fetch_n)).await
                {
                    Ok(Ok(list)) => Ok(list),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err(format!(
                        "timed out after {}ms",
                        self.source_timeout.as_millis()
                    )),
                };
                (source, outcome)
            }
        });

        let mut lists = Vec::new();
        let mut reports = Vec::new();
        let mut failures = Vec::new();

        for (source, outcome) in join_all(fetches).await {
            match outcome {
                Ok(mut list) => {
                    list.dedup();
                    debug!("{} returned {} candidates", source.name(), list.len());
                    reports.push(SourceReport {
                        source: source.name().to_string(),
                        kind: source.kind(),
                        requested: fetch_n,
                        returned: list.len(),
                        weight: 0.0,
                        error: None,
                    });
                    lists.push(list);
                }
                Err(reason) => {
                    warn!("{} unavailable: {}", source.name(), reason);
                    reports.push(SourceReport {
                        source: source.name().to_string(),
                        kind: source.kind(),
                        requested: fetch_n,
                        returned: 0,
                        weight: 0.0,
                        error: Some(reason.clone()),
                    });
                    failures.push(format!("{}: {}", source.name(), reason));
                }
            }
        }

        if lists.is_empty() {
            return Err(FuseError::AllSourcesUnavailable { reasons: failures });
        }
        let degraded = !failures.is_empty();

        let weights = self.strategy.weigh(text, &lists);
        for report in &mut reports {
            if let Some(w) = weights.get(&report.source) {
                report.weight = *w;
            }
        }

        let mut fused = fusion::fuse(&lists, &weights, self.config.rrf_k, fetch_n);
        debug!("Fused to {} candidates", fused.len());

        let (hits, traces) = match request.mmr {
            Some(diversity) => {
                let pool_n = fused.len().min(self.config.rerank_pool.max(k));
                let pool = &mut fused[..pool_n];
                self.fill_embeddings(pool).await;

                // Wire-level mmr is a diversity factor; the reranker
                // takes the classic lambda (1 = pure relevance).
                let lambda = 1.0 - diversity;
                let selections = mmr::rerank(pool, lambda, k);

                let mut hits = Vec::with_capacity(selections.len());
                let mut traces = Vec::with_capacity(selections.len());
                for (position, selection) in selections.iter().enumerate() {
                    let entry = &pool[selection.index];
                    hits.push(SearchHit {
                        rank: position + 1,
                        doc_id: entry.doc_id.clone(),
                        score: selection.mmr_score,
                        text: entry.text.clone(),
                    });
                    traces.push(ResultTrace {
                        doc_id: entry.doc_id.clone(),
                        position: position + 1,
                        fused_score: entry.fused_score,
                        contributions: entry.contributions.clone(),
                        rerank: Some(RerankTrace {
                            mmr_score: selection.mmr_score,
                            iteration: selection.iteration,
                            fallback_similarity: selection.fallback_similarity,
                        }),
                    });
                }
                (hits, traces)
            }
            None => {
                let mut hits = Vec::new();
                let mut traces = Vec::new();
                for (position, entry) in fused.iter().take(k).enumerate() {
                    hits.push(SearchHit {
                        rank: position + 1,
                        doc_id: entry.doc_id.clone(),
                        score: entry.fused_score,
                        text: entry.text.clone(),
                    });
                    traces.push(ResultTrace {
                        doc_id: entry.doc_id.clone(),
                        position: position + 1,
                        fused_score: entry.fused_score,
                        contributions: entry.contributions.clone(),
                        rerank: None,
                    });
                }
                (hits, traces)
            }
        };

        let latency_ms = start.elapsed().as_millis() as u64;
        info!(
            "Search completed in {}ms, returned {} results",
            latency_ms,
            hits.len()
        );

        Ok(QueryResponse {
            query: text.to_string(),
            total_results: hits.len(),
            latency_ms,
            results: hits,
            explain: Explanation {
                degraded,
                rrf_k: self.config.rrf_k,
                weight_strategy: self.strategy.name().to_string(),
                reranked: request.mmr.is_some(),
                diversity: request.mmr,
                sources: reports,
                results: traces,
            },
        })
    }

    /// Embed candidate texts that arrived without a vector, so the
    /// diversity pass can use cosine similarity instead of the lexical
    /// fallback. Failures degrade, they never fail the query.
    async fn fill_embeddings(&self, pool: &mut [FusedEntry]) {
        let Some(embedder) = &self.embedder else {
            return;
        };

        for entry in pool.iter_mut() {
            if entry.embedding.is_some() {
                continue;
            }
            let Some(text) = entry.text.clone() else {
                continue;
            };
            match embedder.embed(&text).await {
                Ok(vector) => entry.embedding = Some(vector),
                Err(e) => {
                    warn!(
                        "Embedding for rerank failed ({}), using lexical similarity fallback",
                        e
                    );
                    break;
                }
            }
        }
    }
}
