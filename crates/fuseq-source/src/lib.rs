//! fuseq-source - Candidate source adapters
//!
//! Uniform [`CandidateSource`] adapters over the two backing indices
//! (Qdrant for vector similarity, Meilisearch for lexical search), plus
//! the Ollama embedding client and deterministic in-memory mocks for
//! tests.
//!
//! Adapters preserve the backing index's own ordering and enforce the
//! no-duplicate-ids invariant on every list they return. Transport
//! failures surface as `SourceUnavailable`; an empty hit list is a
//! valid result.

mod meili;
mod mock;
mod ollama;
mod qdrant;

pub use meili::MeiliSource;
pub use mock::{MockEmbedder, StaticSource};
pub use ollama::OllamaEmbedder;
pub use qdrant::QdrantSource;

// Re-export for convenience
pub use fuseq_core::{CandidateSource, Embedder};
