//! fuseq-query - Rank fusion and query orchestration
//!
//! This crate provides the query-time pipeline that fuses ranked candidate
//! lists from independent sources using weighted Reciprocal Rank Fusion
//! (RRF) and optionally re-ranks the fused list for diversity with Maximal
//! Marginal Relevance (MMR).
//!
//! # Features
//!
//! - Weighted RRF with deterministic tie-breaks
//! - Pluggable adaptive weight strategies
//! - Greedy MMR diversity reranking with embedding or lexical similarity
//! - Concurrent source dispatch with per-adapter timeouts and
//!   partial-failure recovery
//!
//! # Example
//!
//! ```rust,ignore
//! use fuseq_query::QueryEngine;
//! use fuseq_core::QueryRequest;
//!
//! let engine = QueryEngine::new(sources, strategy, config, timeout);
//! let response = engine.search(&QueryRequest::new("error handling")).await?;
//! ```

mod engine;
mod fusion;
mod mmr;
mod weights;

pub use engine::QueryEngine;
pub use fusion::fuse;
pub use mmr::{rerank, MmrSelection};
pub use weights::{build_strategy, FixedStrategy, QueryLengthStrategy, ScoreSpreadStrategy, WeightStrategy};

// Re-export for convenience
pub use fuseq_core::{Explanation, QueryRequest, QueryResponse, SearchHit};
