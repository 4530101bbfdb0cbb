//! Vector-first retrieval with lexical fallback.
//!
//! The decision between strategies is an explicit state machine: [`next_state`] is a pure
//! function of the current state, the step just observed and the similarity threshold.

use std::collections::BTreeMap;

use faq_core::config::RetrievalConfig;
use faq_core::domain::RetrievalHit;
use faq_core::lexical::LexicalSearch;
use faq_core::query::Query;
use serde::{Deserialize, Serialize};

use crate::retrieve::VectorSearch;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalState {
    VectorAttempted,
    /// Vector hits passed the threshold and are used alone.
    VectorOnly,
    LexicalFallback,
    Merged,
    Empty,
}

/// What a retrieval step observed. `top_score` is `None` when the step failed or
/// returned no hits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Vector { top_score: Option<f32> },
    Lexical { top_score: Option<f32> },
}

fn passes(top_score: Option<f32>, threshold: f32) -> bool {
    matches!(top_score, Some(s) if s >= threshold)
}

pub fn next_state(state: RetrievalState, step: Step, threshold: f32) -> RetrievalState {
    use RetrievalState::*;
    match (state, step) {
        (VectorAttempted, Step::Vector { top_score }) if passes(top_score, threshold) => VectorOnly,
        (VectorAttempted, Step::Vector { .. }) => LexicalFallback,
        (LexicalFallback, Step::Lexical { top_score: None }) => Empty,
        (LexicalFallback, Step::Lexical { .. }) => LexicalFallback,
        // Supplementary lexical pass after accepted vector hits.
        (VectorOnly, Step::Lexical { top_score }) if passes(top_score, threshold) => Merged,
        (VectorOnly, Step::Lexical { .. }) => VectorOnly,
        (s, _) => s,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalOutcome {
    pub state: RetrievalState,
    pub hits: Vec<RetrievalHit>,
    pub top_score: Option<f32>,
}

impl RetrievalOutcome {
    fn new(state: RetrievalState, hits: Vec<RetrievalHit>) -> Self {
        let top_score = hits.first().map(|h| h.score);
        Self {
            state,
            hits,
            top_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridPolicy {
    pub similarity_threshold: f32,
    pub lexical_max_results: usize,
    pub lexical_supplement: bool,
}

impl Default for HybridPolicy {
    fn default() -> Self {
        Self::from(&RetrievalConfig::default())
    }
}

impl From<&RetrievalConfig> for HybridPolicy {
    fn from(c: &RetrievalConfig) -> Self {
        Self {
            similarity_threshold: c.similarity_threshold,
            lexical_max_results: c.lexical_max_results,
            lexical_supplement: c.lexical_supplement,
        }
    }
}

pub struct HybridRetriever<V, L> {
    vector: V,
    lexical: L,
    policy: HybridPolicy,
}

impl<V: VectorSearch, L: LexicalSearch> HybridRetriever<V, L> {
    pub fn new(vector: V, lexical: L, policy: HybridPolicy) -> Self {
        Self {
            vector,
            lexical,
            policy,
        }
    }

    /// Run the fallback chain for one query. Never fails: embedding errors are logged and
    /// routed to lexical search.
    pub fn retrieve(&self, query: &Query, top_k: usize) -> RetrievalOutcome {
        if top_k == 0 {
            return RetrievalOutcome::new(RetrievalState::Empty, Vec::new());
        }
        let threshold = self.policy.similarity_threshold;
        let lexical_max = self.policy.lexical_max_results.min(top_k);
        let mut state = RetrievalState::VectorAttempted;

        let vector_hits = match self.vector.search(query, top_k) {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(
                    code = %e.code,
                    error = %e,
                    "vector retrieval unavailable; using lexical search"
                );
                Vec::new()
            }
        };
        state = next_state(
            state,
            Step::Vector {
                top_score: vector_hits.first().map(|h| h.score),
            },
            threshold,
        );

        let outcome = match state {
            RetrievalState::VectorOnly if self.policy.lexical_supplement => {
                let lexical_hits = self.lexical.search(&query.expanded, lexical_max);
                state = next_state(
                    state,
                    Step::Lexical {
                        top_score: lexical_hits.first().map(|h| h.score),
                    },
                    threshold,
                );
                if state == RetrievalState::Merged {
                    RetrievalOutcome::new(state, merge_hits(vector_hits, lexical_hits, top_k))
                } else {
                    RetrievalOutcome::new(state, vector_hits)
                }
            }
            RetrievalState::VectorOnly => RetrievalOutcome::new(state, vector_hits),
            _ => {
                let lexical_hits = self.lexical.search(&query.expanded, lexical_max);
                state = next_state(
                    state,
                    Step::Lexical {
                        top_score: lexical_hits.first().map(|h| h.score),
                    },
                    threshold,
                );
                RetrievalOutcome::new(state, lexical_hits)
            }
        };

        tracing::debug!(
            state = ?outcome.state,
            hits = outcome.hits.len(),
            "hybrid retrieval complete"
        );
        outcome
    }
}

/// Union by chunk id keeping the higher score, re-sorted and re-ranked.
fn merge_hits(a: Vec<RetrievalHit>, b: Vec<RetrievalHit>, top_k: usize) -> Vec<RetrievalHit> {
    let mut best: BTreeMap<u64, RetrievalHit> = BTreeMap::new();
    for hit in a.into_iter().chain(b) {
        match best.get(&hit.chunk_id) {
            Some(existing) if existing.score >= hit.score => {}
            _ => {
                best.insert(hit.chunk_id, hit);
            }
        }
    }
    let mut merged: Vec<RetrievalHit> = best.into_values().collect();
    merged.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.chunk_id.cmp(&b.chunk_id))
    });
    merged.truncate(top_k);
    for (rank, hit) in merged.iter_mut().enumerate() {
        hit.rank = rank as u32;
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use faq_core::domain::Strategy;
    use super::RetrievalState::*;

    #[test]
    fn transitions_follow_threshold() {
        let v = |s| Step::Vector { top_score: s };
        let l = |s| Step::Lexical { top_score: s };
        assert_eq!(next_state(VectorAttempted, v(Some(0.3)), 0.3), VectorOnly);
        assert_eq!(next_state(VectorAttempted, v(Some(0.29)), 0.3), LexicalFallback);
        assert_eq!(next_state(VectorAttempted, v(None), 0.3), LexicalFallback);
        assert_eq!(next_state(LexicalFallback, l(None), 0.3), Empty);
        assert_eq!(next_state(LexicalFallback, l(Some(0.05)), 0.3), LexicalFallback);
        assert_eq!(next_state(VectorOnly, l(Some(0.4)), 0.3), Merged);
        assert_eq!(next_state(VectorOnly, l(Some(0.2)), 0.3), VectorOnly);
        assert_eq!(next_state(Empty, v(Some(0.9)), 0.3), Empty);
    }

    fn hit(chunk_id: u64, score: f32, strategy: Strategy, rank: u32) -> RetrievalHit {
        RetrievalHit {
            chunk_id,
            score,
            strategy,
            rank,
        }
    }

    #[test]
    fn merge_keeps_higher_score_and_reranks() {
        let merged = merge_hits(
            vec![hit(1, 0.8, Strategy::Vector, 0), hit(2, 0.4, Strategy::Vector, 1)],
            vec![hit(2, 0.6, Strategy::Lexical, 0), hit(3, 0.6, Strategy::Lexical, 1)],
            8,
        );
        let view: Vec<(u64, u32, Strategy)> =
            merged.iter().map(|h| (h.chunk_id, h.rank, h.strategy)).collect();
        assert_eq!(
            view,
            vec![
                (1, 0, Strategy::Vector),
                (2, 1, Strategy::Lexical),
                (3, 2, Strategy::Lexical)
            ]
        );
    }
}
