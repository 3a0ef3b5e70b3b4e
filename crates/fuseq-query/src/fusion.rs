//! Weighted Reciprocal Rank Fusion (RRF) for combining ranked lists.

use std::collections::HashMap;

use fuseq_core::{FusedEntry, RankedList, SourceContribution};

/// Fuse ranked lists into a single ranking using weighted RRF.
///
/// fused_score(d) = Σ weight[source] / (rrf_k + rank_source(d))
///
/// Ranks are 1-based; a document absent from a source contributes 0 for
/// that term. `rrf_k` (commonly 60) dampens the influence of the very top
/// ranks. A source missing from `weights` contributes with weight 0.
///
/// Equal fused scores break ties deterministically: presence in more
/// sources, then best single-source rank, then document id.
///
/// # Arguments
/// * `lists` - One ranked list per source, best first
/// * `weights` - Fusion weight per source name, normalized by the caller
/// * `rrf_k` - Smoothing constant
/// * `top_n` - Maximum number of fused entries to return
pub fn fuse(
    lists: &[RankedList],
    weights: &HashMap<String, f32>,
    rrf_k: f32,
    top_n: usize,
) -> Vec<FusedEntry> {
    let mut entries: HashMap<String, FusedEntry> = HashMap::new();

    for list in lists {
        let weight = weights.get(&list.source).copied().unwrap_or(0.0);
        for (idx, candidate) in list.candidates.iter().enumerate() {
            let rank = idx + 1;
            let entry = entries
                .entry(candidate.doc_id.clone())
                .or_insert_with(|| FusedEntry {
                    doc_id: candidate.doc_id.clone(),
                    fused_score: 0.0,
                    contributions: Vec::new(),
                    text: None,
                    embedding: None,
                });

            entry.fused_score += weight / (rrf_k + rank as f32);
            entry.contributions.push(SourceContribution {
                source: list.source.clone(),
                kind: list.kind,
                rank,
                raw_score: candidate.score,
            });

            // Carry whichever representation a source provides
            if entry.text.is_none() {
                entry.text = candidate.text.clone();
            }
            if entry.embedding.is_none() {
                entry.embedding = candidate.embedding.clone();
            }
        }
    }

    let mut fused: Vec<FusedEntry> = entries.into_values().collect();

    fused.sort_by(|a, b| {
        b.fused_score
            .partial_cmp(&a.fused_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.source_count().cmp(&a.source_count()))
            .then_with(|| a.best_rank().cmp(&b.best_rank()))
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });

    fused.truncate(top_n);
    fused
}
