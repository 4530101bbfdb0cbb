//! Sentence-level extraction and ranking over retrieval hits.

use std::collections::BTreeSet;

use crate::config::RankingConfig;
use crate::domain::{RetrievalHit, SentenceHit};
use crate::knowledge::KnowledgeBase;
use crate::query::Query;
use crate::text::{split_sentences, token_overlap, token_set};

pub const MAX_SENTENCES_LIMIT: usize = 6;

/// Splits hit chunks into sentences and scores each one as
/// `hit.score - hit.rank * rank_penalty + min(relevance_cap, relevance_per_term * matched_terms)`.
#[derive(Debug, Clone)]
pub struct SentenceRanker<'a> {
    kb: &'a KnowledgeBase,
    config: RankingConfig,
}

struct Candidate {
    hit: SentenceHit,
    tokens: BTreeSet<String>,
}

impl<'a> SentenceRanker<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self {
            kb,
            config: RankingConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RankingConfig) -> Self {
        self.config = config;
        self
    }

    /// Extract the best `max_sentences` sentences (clamped to `1..=6`) from `hits`.
    ///
    /// Hits referencing unknown chunk ids are skipped.
    pub fn extract(
        &self,
        query: &Query,
        hits: &[RetrievalHit],
        max_sentences: usize,
    ) -> Vec<SentenceHit> {
        let limit = max_sentences.clamp(1, MAX_SENTENCES_LIMIT);
        let query_terms: BTreeSet<&str> = query.expanded.iter().map(String::as_str).collect();

        let mut ordered: Vec<&RetrievalHit> = hits.iter().collect();
        ordered.sort_by(|a, b| a.rank.cmp(&b.rank).then(a.chunk_id.cmp(&b.chunk_id)));

        let mut candidates: Vec<Candidate> = Vec::new();
        for hit in ordered {
            let Some(chunk) = self.kb.get(hit.chunk_id) else {
                tracing::debug!(chunk_id = hit.chunk_id, "hit references unknown chunk");
                continue;
            };
            for (idx, sentence) in split_sentences(&chunk.text).into_iter().enumerate() {
                if sentence.chars().count() < self.config.min_sentence_chars {
                    continue;
                }
                let tokens = token_set(&sentence);
                let matched = tokens
                    .iter()
                    .filter(|t| query_terms.contains(t.as_str()))
                    .count();
                let per_term = self.config.relevance_per_term * matched as f32;
                let relevance = per_term.min(self.config.relevance_cap);
                let score = hit.score - hit.rank as f32 * self.config.rank_penalty + relevance;
                candidates.push(Candidate {
                    hit: SentenceHit {
                        text: sentence,
                        score,
                        chunk_id: chunk.id,
                        source: chunk.source.clone(),
                        page: chunk.page,
                        hit_rank: hit.rank,
                        sentence_index: idx.min(u32::MAX as usize) as u32,
                    },
                    tokens,
                });
            }
        }

        candidates.sort_by(|a, b| compare_sentence_hits(&a.hit, &b.hit));

        let mut kept: Vec<Candidate> = Vec::new();
        for c in candidates {
            if kept.len() >= limit {
                break;
            }
            let duplicate = kept
                .iter()
                .any(|k| token_overlap(&k.tokens, &c.tokens) > self.config.duplicate_overlap);
            if !duplicate {
                kept.push(c);
            }
        }

        tracing::debug!(sentences = kept.len(), "sentence ranking complete");
        kept.into_iter().map(|c| c.hit).collect()
    }
}

/// Score descending, then `(hit_rank, sentence_index)` ascending.
pub fn compare_sentence_hits(a: &SentenceHit, b: &SentenceHit) -> std::cmp::Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then(a.hit_rank.cmp(&b.hit_rank))
        .then(a.sentence_index.cmp(&b.sentence_index))
}
