//! Adaptive per-query weighting of candidate sources.
//!
//! The fusion engine does not hard-code how much to trust each source;
//! it asks a [`WeightStrategy`] for per-query weights. Strategies are
//! pure and deterministic, and always normalize to sum to 1 across the
//! sources that returned candidates, so an empty source's weight is
//! redistributed to the remaining ones.

use std::collections::HashMap;
use std::sync::Arc;

use fuseq_core::{
    FixedWeights, QueryLengthHeuristics, RankedList, SearchConfig, SourceKind, WeightStrategyKind,
};

/// Weight floor so a degenerate score distribution never zeroes out an
/// active source.
const MIN_CONFIDENCE: f32 = 0.05;

/// Per-query fusion weight computation.
pub trait WeightStrategy: Send + Sync {
    /// Strategy name recorded in the explanation.
    fn name(&self) -> &'static str;

    /// Compute a weight per source name, normalized to sum to 1 over
    /// sources with a non-empty list. Sources with empty lists are
    /// omitted from the result.
    fn weigh(&self, query: &str, lists: &[RankedList]) -> HashMap<String, f32>;
}

/// Build the configured strategy.
pub fn build_strategy(config: &SearchConfig) -> Arc<dyn WeightStrategy> {
    match config.weight_strategy {
        WeightStrategyKind::ScoreSpread => Arc::new(ScoreSpreadStrategy),
        WeightStrategyKind::QueryLength => Arc::new(QueryLengthStrategy::new(config.heuristics)),
        WeightStrategyKind::Fixed => Arc::new(FixedStrategy::new(config.fixed_weights)),
    }
}

/// Normalize raw per-source confidences to sum to 1.
///
/// A zero (or empty) total falls back to uniform weights over the given
/// sources.
fn normalize(raw: Vec<(String, f32)>) -> HashMap<String, f32> {
    if raw.is_empty() {
        return HashMap::new();
    }

    let total: f32 = raw.iter().map(|(_, w)| w).sum();
    if total <= f32::EPSILON {
        let uniform = 1.0 / raw.len() as f32;
        return raw.into_iter().map(|(name, _)| (name, uniform)).collect();
    }

    raw.into_iter().map(|(name, w)| (name, w / total)).collect()
}

/// Weight sources by how sharply their score distributions discriminate.
///
/// Confidence for a source is the population standard deviation of its
/// min-max-normalized raw scores: a source whose scores separate hits
/// clearly gets more fusion weight than one returning a flat list.
/// Floored at [`MIN_CONFIDENCE`] so every active source keeps a say.
pub struct ScoreSpreadStrategy;

impl ScoreSpreadStrategy {
    fn confidence(list: &RankedList) -> f32 {
        let scores: Vec<f32> = list.candidates.iter().map(|c| c.score).collect();
        if scores.len() < 2 {
            return MIN_CONFIDENCE;
        }

        let min = scores.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        if (max - min).abs() <= f32::EPSILON {
            return MIN_CONFIDENCE;
        }

        let normalized: Vec<f32> = scores.iter().map(|s| (s - min) / (max - min)).collect();
        let mean = normalized.iter().sum::<f32>() / normalized.len() as f32;
        let variance = normalized
            .iter()
            .map(|s| (s - mean) * (s - mean))
            .sum::<f32>()
            / normalized.len() as f32;

        variance.sqrt().max(MIN_CONFIDENCE)
    }
}

impl WeightStrategy for ScoreSpreadStrategy {
    fn name(&self) -> &'static str {
        "score-spread"
    }

    fn weigh(&self, _query: &str, lists: &[RankedList]) -> HashMap<String, f32> {
        let raw = lists
            .iter()
            .filter(|l| !l.is_empty())
            .map(|l| (l.source.clone(), Self::confidence(l)))
            .collect();
        normalize(raw)
    }
}

/// Boost the lexical source on short queries, the vector source on long
/// ones.
///
/// Short keyword-ish queries tend to be answered better by exact term
/// matching, long natural-language ones by embeddings.
pub struct QueryLengthStrategy {
    heuristics: QueryLengthHeuristics,
}

impl QueryLengthStrategy {
    pub fn new(heuristics: QueryLengthHeuristics) -> Self {
        Self { heuristics }
    }
}

impl WeightStrategy for QueryLengthStrategy {
    fn name(&self) -> &'static str {
        "query-length"
    }

    fn weigh(&self, query: &str, lists: &[RankedList]) -> HashMap<String, f32> {
        let token_count = query.split_whitespace().count();
        let is_short = query.len() <= self.heuristics.short_query_chars
            || token_count <= self.heuristics.short_query_tokens;

        let (w_vector, w_lexical) = if is_short {
            (
                1.0 - self.heuristics.boost_lexical_on_short,
                self.heuristics.boost_lexical_on_short,
            )
        } else {
            (
                self.heuristics.boost_vector_on_long,
                1.0 - self.heuristics.boost_vector_on_long,
            )
        };

        let raw = lists
            .iter()
            .filter(|l| !l.is_empty())
            .map(|l| {
                let w = match l.kind {
                    SourceKind::Vector => w_vector,
                    SourceKind::Lexical => w_lexical,
                };
                (l.source.clone(), w)
            })
            .collect();
        normalize(raw)
    }
}

/// Static per-kind weights from configuration.
pub struct FixedStrategy {
    weights: FixedWeights,
}

impl FixedStrategy {
    pub fn new(weights: FixedWeights) -> Self {
        Self { weights }
    }
}

impl WeightStrategy for FixedStrategy {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn weigh(&self, _query: &str, lists: &[RankedList]) -> HashMap<String, f32> {
        let raw = lists
            .iter()
            .filter(|l| !l.is_empty())
            .map(|l| {
                let w = match l.kind {
                    SourceKind::Vector => self.weights.vector,
                    SourceKind::Lexical => self.weights.lexical,
                };
                (l.source.clone(), w)
            })
            .collect();
        normalize(raw)
    }
}
