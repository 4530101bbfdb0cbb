//! BM25 keyword search, used when vector retrieval is unavailable or weak.
//!
//! Scores are normalized into `[0, 1]` by the score a chunk would earn if it matched
//! every query term that occurs anywhere in the corpus, so they can be compared against
//! the same threshold as cosine similarity.

use std::collections::BTreeMap;

use crate::domain::{Chunk, RetrievalHit, Strategy};
use crate::knowledge::KnowledgeBase;
use crate::text::{normalize, suffix_variants};

pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Inverted index built once over the chunk collection. Each token is posted under its
/// suffix variants too, so `books` in a query meets `book` in a chunk.
#[derive(Debug, Clone, Default)]
pub struct LexicalIndex {
    // term -> [(chunk position, term frequency)], positions ascending.
    postings: BTreeMap<String, Vec<(usize, u32)>>,
    doc_len: Vec<u32>,
    chunk_ids: Vec<u64>,
    avg_len: f32,
}

impl LexicalIndex {
    pub fn build(chunks: &[Chunk]) -> Self {
        let mut postings: BTreeMap<String, Vec<(usize, u32)>> = BTreeMap::new();
        let mut doc_len = Vec::with_capacity(chunks.len());
        let mut chunk_ids = Vec::with_capacity(chunks.len());

        for (pos, chunk) in chunks.iter().enumerate() {
            let tokens = normalize(&chunk.text);
            doc_len.push(tokens.len().min(u32::MAX as usize) as u32);
            chunk_ids.push(chunk.id);

            let mut tf: BTreeMap<String, u32> = BTreeMap::new();
            for t in &tokens {
                for v in suffix_variants(t) {
                    *tf.entry(v).or_insert(0) += 1;
                }
            }
            for (term, freq) in tf {
                postings.entry(term).or_default().push((pos, freq));
            }
        }

        let total: u64 = doc_len.iter().map(|&l| l as u64).sum();
        let avg_len = if doc_len.is_empty() {
            0.0
        } else {
            total as f32 / doc_len.len() as f32
        };

        Self {
            postings,
            doc_len,
            chunk_ids,
            avg_len,
        }
    }

    pub fn doc_count(&self) -> usize {
        self.doc_len.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.postings.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

/// Keyword search over query tokens.
pub trait LexicalSearch {
    fn search(&self, tokens: &[String], max_results: usize) -> Vec<RetrievalHit>;
}

#[derive(Debug, Clone, Copy)]
pub struct LexicalSearcher<'a> {
    kb: &'a KnowledgeBase,
    params: Bm25Params,
}

impl<'a> LexicalSearcher<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self {
            kb,
            params: Bm25Params::default(),
        }
    }

    fn idf(&self, doc_freq: usize) -> f32 {
        let n = self.kb.lexicon().doc_count() as f32;
        let df = doc_freq as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }
}

impl LexicalSearch for LexicalSearcher<'_> {
    fn search(&self, tokens: &[String], max_results: usize) -> Vec<RetrievalHit> {
        let index = self.kb.lexicon();
        let Bm25Params { k1, b } = self.params;

        let mut terms: Vec<String> = Vec::new();
        for t in tokens {
            for v in suffix_variants(t) {
                if !terms.contains(&v) {
                    terms.push(v);
                }
            }
        }

        let mut upper = 0.0f32;
        let mut scores: BTreeMap<usize, f32> = BTreeMap::new();
        for term in &terms {
            let Some(list) = index.postings.get(term) else {
                continue;
            };
            let idf = self.idf(list.len());
            upper += idf * (k1 + 1.0);
            for &(pos, tf) in list {
                let tf = tf as f32;
                let len_ratio = if index.avg_len > 0.0 {
                    index.doc_len[pos] as f32 / index.avg_len
                } else {
                    1.0
                };
                let part = idf * tf * (k1 + 1.0) / (tf + k1 * (1.0 - b + b * len_ratio));
                *scores.entry(pos).or_insert(0.0) += part;
            }
        }

        if upper <= 0.0 || scores.is_empty() {
            tracing::debug!("lexical search found no overlapping terms");
            return Vec::new();
        }

        let mut ranked: Vec<(u64, f32)> = scores
            .into_iter()
            .map(|(pos, s)| (index.chunk_ids[pos], (s / upper).min(1.0)))
            .filter(|(_, s)| *s > 0.0)
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.truncate(max_results);

        tracing::debug!(hits = ranked.len(), "lexical search complete");
        ranked
            .into_iter()
            .enumerate()
            .map(|(rank, (chunk_id, score))| RetrievalHit {
                chunk_id,
                score,
                strategy: Strategy::Lexical,
                rank: rank as u32,
            })
            .collect()
    }
}
