//! Core traits defining the interfaces between components.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{RankedList, SourceKind};

/// A backing index that answers top-n-by-score queries.
///
/// Implementations must preserve the backing index's own ordering and
/// must not reorder by raw score; raw scores are source-specific and
/// not comparable across adapters. An empty hit list is a valid result,
/// not an error.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Stable adapter name, used as the weight key and in explanations.
    fn name(&self) -> &str;

    /// Kind of backing index.
    fn kind(&self) -> SourceKind;

    /// Fetch up to `top_n` candidates for `query`, best first.
    ///
    /// Fails with `SourceUnavailable` when the backing index cannot be
    /// reached or its response cannot be understood.
    async fn fetch(&self, query: &str, top_n: usize) -> Result<RankedList>;
}

/// Opaque text-to-vector embedding function.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
