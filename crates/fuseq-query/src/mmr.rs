//! Maximal Marginal Relevance (MMR) reranking for result diversity.
//!
//! Greedy selection over the fused candidate pool:
//!
//! MMR(d) = lambda * relevance(d) - (1 - lambda) * max_{s in selected} similarity(d, s)
//!
//! lambda = 1 is pure relevance, lambda = 0 pure diversity. Relevance is
//! the fused score min-max normalized over the pool. Similarity is
//! embedding cosine, falling back to lexical token overlap when a
//! candidate has no embedding; the fallback is flagged per candidate so
//! callers can surface it in the explanation.

use std::collections::HashSet;

use fuseq_core::FusedEntry;

/// One greedily selected candidate.
#[derive(Debug, Clone)]
pub struct MmrSelection {
    /// Index into the input pool.
    pub index: usize,

    /// MMR score at the iteration this candidate was chosen.
    pub mmr_score: f32,

    /// Greedy iteration (0-based).
    pub iteration: usize,

    /// True when this candidate has no embedding, so any similarity
    /// involving it used the lexical fallback.
    pub fallback_similarity: bool,
}

/// Rerank the fused pool, returning up to `k` selections in MMR order.
///
/// With `k` at or above the pool size every candidate is returned, in
/// MMR order. Ties on the MMR score prefer higher relevance, then
/// document id lexical order.
pub fn rerank(pool: &[FusedEntry], lambda: f32, k: usize) -> Vec<MmrSelection> {
    if pool.is_empty() || k == 0 {
        return Vec::new();
    }

    let relevance = normalize_relevance(pool);

    let mut selected: Vec<usize> = Vec::new();
    let mut selections: Vec<MmrSelection> = Vec::new();
    let mut remaining: Vec<usize> = (0..pool.len()).collect();

    while !remaining.is_empty() && selections.len() < k {
        let mut best: Option<(usize, f32)> = None;

        for &idx in &remaining {
            let diversity = selected
                .iter()
                .map(|&s| similarity(&pool[idx], &pool[s]))
                .fold(0.0f32, f32::max);
            let score = lambda * relevance[idx] - (1.0 - lambda) * diversity;

            let better = match best {
                None => true,
                Some((best_idx, best_score)) => {
                    score > best_score
                        || (score == best_score
                            && (relevance[idx] > relevance[best_idx]
                                || (relevance[idx] == relevance[best_idx]
                                    && pool[idx].doc_id < pool[best_idx].doc_id)))
                }
            };
            if better {
                best = Some((idx, score));
            }
        }

        let (chosen, score) = best.expect("remaining is non-empty");
        remaining.retain(|&i| i != chosen);
        selections.push(MmrSelection {
            index: chosen,
            mmr_score: score,
            iteration: selected.len(),
            fallback_similarity: pool[chosen].embedding.is_none(),
        });
        selected.push(chosen);
    }

    selections
}

/// Min-max normalize fused scores to [0, 1]; a flat pool maps to 0.5.
fn normalize_relevance(pool: &[FusedEntry]) -> Vec<f32> {
    let min = pool
        .iter()
        .map(|e| e.fused_score)
        .fold(f32::INFINITY, f32::min);
    let max = pool
        .iter()
        .map(|e| e.fused_score)
        .fold(f32::NEG_INFINITY, f32::max);

    if (max - min).abs() <= 1e-9 {
        return vec![0.5; pool.len()];
    }

    pool.iter()
        .map(|e| (e.fused_score - min) / (max - min))
        .collect()
}

/// Pairwise similarity: embedding cosine when both sides have vectors,
/// lexical token overlap otherwise.
fn similarity(a: &FusedEntry, b: &FusedEntry) -> f32 {
    match (&a.embedding, &b.embedding) {
        (Some(va), Some(vb)) => cosine(va, vb),
        _ => token_overlap(a.text.as_deref(), b.text.as_deref()),
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt() + 1e-12;
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt() + 1e-12;
    dot / (na * nb)
}

/// Jaccard overlap of lowercased alphanumeric token sets.
fn token_overlap(a: Option<&str>, b: Option<&str>) -> f32 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0.0;
    };

    let tokens = |s: &str| -> HashSet<String> {
        s.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect()
    };

    let ta = tokens(a);
    let tb = tokens(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let intersection = ta.intersection(&tb).count() as f32;
    let union = ta.union(&tb).count() as f32;
    intersection / union
}
