mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use faq_ai::hybrid::{HybridPolicy, HybridRetriever, RetrievalState};
use faq_ai::retrieve::{VectorRetriever, VectorSearch};
use faq_core::domain::{RetrievalHit, Strategy};
use faq_core::error::AppError;
use faq_core::lexical::{LexicalSearch, LexicalSearcher};
use faq_core::query::Query;
use faq_core::text::SynonymTable;
use pretty_assertions::assert_eq;

use common::{campus_kb, DownEmbedder, FixedEmbedder, SCENARIO_QUERY};

struct CountingLexical<'a> {
    inner: LexicalSearcher<'a>,
    calls: &'a AtomicUsize,
}

impl LexicalSearch for CountingLexical<'_> {
    fn search(&self, tokens: &[String], max_results: usize) -> Vec<RetrievalHit> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.search(tokens, max_results)
    }
}

struct CountingVector<'a> {
    inner: VectorRetriever<'a>,
    calls: &'a AtomicUsize,
}

impl VectorSearch for CountingVector<'_> {
    fn search(&self, query: &Query, top_k: usize) -> Result<Vec<RetrievalHit>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.search(query, top_k)
    }
}

struct Run {
    state: RetrievalState,
    hits: Vec<RetrievalHit>,
    vector_calls: usize,
    lexical_calls: usize,
}

fn run(embedder: &dyn faq_ai::embeddings::Embedder, raw: &str, policy: HybridPolicy) -> Run {
    let query = Query::parse(raw, &SynonymTable::builtin());
    run_query(embedder, &query, policy, 8)
}

fn run_query(
    embedder: &dyn faq_ai::embeddings::Embedder,
    query: &Query,
    policy: HybridPolicy,
    top_k: usize,
) -> Run {
    let kb = campus_kb();
    let vector_calls = AtomicUsize::new(0);
    let lexical_calls = AtomicUsize::new(0);
    let retriever = HybridRetriever::new(
        CountingVector {
            inner: VectorRetriever::new(&kb, embedder, "mock"),
            calls: &vector_calls,
        },
        CountingLexical {
            inner: LexicalSearcher::new(&kb),
            calls: &lexical_calls,
        },
        policy,
    );
    let outcome = retriever.retrieve(query, top_k);
    Run {
        state: outcome.state,
        hits: outcome.hits,
        vector_calls: vector_calls.load(Ordering::SeqCst),
        lexical_calls: lexical_calls.load(Ordering::SeqCst),
    }
}

#[test]
fn passing_vector_hits_skip_lexical_search() {
    // Parallel to chunk 2's embedding: cosine 1.0.
    let r = run(
        &FixedEmbedder(vec![0.6, 0.8, 0.0, 0.0]),
        SCENARIO_QUERY,
        HybridPolicy::default(),
    );
    assert_eq!(r.state, RetrievalState::VectorOnly);
    assert_eq!(r.vector_calls, 1);
    assert_eq!(r.lexical_calls, 0);
    assert_eq!(r.hits[0].chunk_id, 2);
    assert!(r.hits.iter().all(|h| h.strategy == Strategy::Vector));
    let ranks: Vec<u32> = r.hits.iter().map(|h| h.rank).collect();
    assert_eq!(ranks, vec![0, 1, 2]);
}

#[test]
fn weak_vector_hits_fall_back_to_lexical() {
    // Best cosine is chunk 3 at ~0.196, below 0.3.
    let r = run(
        &FixedEmbedder(vec![0.0, 0.0, 0.0, 1.0]),
        SCENARIO_QUERY,
        HybridPolicy::default(),
    );
    assert_eq!(r.state, RetrievalState::LexicalFallback);
    assert_eq!(r.lexical_calls, 1);
    assert_eq!(r.hits[0].chunk_id, 2);
    assert!(r.hits.iter().all(|h| h.strategy == Strategy::Lexical));
}

#[test]
fn failing_embedder_falls_back_to_lexical() {
    let r = run(&DownEmbedder, SCENARIO_QUERY, HybridPolicy::default());
    assert_eq!(r.state, RetrievalState::LexicalFallback);
    assert_eq!(r.vector_calls, 1);
    assert_eq!(r.lexical_calls, 1);
    let ids: Vec<u64> = r.hits.iter().map(|h| h.chunk_id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn zero_vector_and_no_overlap_end_empty() {
    let r = run(
        &FixedEmbedder(vec![0.0; 4]),
        "quantum chromodynamics",
        HybridPolicy::default(),
    );
    assert_eq!(r.state, RetrievalState::Empty);
    assert_eq!(r.lexical_calls, 1);
    assert!(r.hits.is_empty());
}

#[test]
fn dimension_mismatch_is_treated_as_unavailable() {
    let r = run(&FixedEmbedder(vec![1.0, 0.0]), "late fine", HybridPolicy::default());
    assert_eq!(r.state, RetrievalState::LexicalFallback);
    assert_eq!(r.hits[0].chunk_id, 2);
}

#[test]
fn supplement_policy_merges_when_both_pass() {
    let policy = HybridPolicy {
        lexical_supplement: true,
        ..HybridPolicy::default()
    };
    let r = run(&FixedEmbedder(vec![0.6, 0.8, 0.0, 0.0]), "late fine", policy);
    assert_eq!(r.state, RetrievalState::Merged);
    assert_eq!(r.lexical_calls, 1);
    assert_eq!(r.hits[0].chunk_id, 2);
    assert_eq!(r.hits[0].strategy, Strategy::Vector);
    let mut ids: Vec<u64> = r.hits.iter().map(|h| h.chunk_id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), r.hits.len());

    // Lexical top (~0.29) does not pass for the scenario query: vector hits stand alone.
    let r = run(&FixedEmbedder(vec![0.6, 0.8, 0.0, 0.0]), SCENARIO_QUERY, policy);
    assert_eq!(r.state, RetrievalState::VectorOnly);
    assert_eq!(r.lexical_calls, 1);
}

#[test]
fn threshold_is_a_policy_parameter() {
    let strict = HybridPolicy {
        similarity_threshold: 0.995,
        ..HybridPolicy::default()
    };
    // Cosine with chunk 2 is ~0.990: passes the default, not the strict policy.
    let embedder = FixedEmbedder(vec![0.6, 0.6, 0.0, 0.0]);
    assert_eq!(
        run(&embedder, SCENARIO_QUERY, HybridPolicy::default()).state,
        RetrievalState::VectorOnly
    );
    assert_eq!(
        run(&embedder, SCENARIO_QUERY, strict).state,
        RetrievalState::LexicalFallback
    );
}

#[test]
fn plural_query_reaches_singular_chunk_text_when_vectors_are_down() {
    let r = run(&DownEmbedder, "overdue books", HybridPolicy::default());
    assert_eq!(r.state, RetrievalState::LexicalFallback);
    let ids: Vec<u64> = r.hits.iter().map(|h| h.chunk_id).collect();
    assert_eq!(ids, vec![2]);

    let r = run(&DownEmbedder, "semesters", HybridPolicy::default());
    assert_eq!(r.hits[0].chunk_id, 3);
}

#[test]
fn precomputed_query_embedding_skips_the_embedder() {
    let query = Query::parse(SCENARIO_QUERY, &SynonymTable::builtin())
        .with_embedding(vec![0.6, 0.8, 0.0, 0.0]);
    let r = run_query(&DownEmbedder, &query, HybridPolicy::default(), 8);
    assert_eq!(r.state, RetrievalState::VectorOnly);
    assert_eq!(r.lexical_calls, 0);
    assert_eq!(r.hits[0].chunk_id, 2);
}

#[test]
fn zero_top_k_returns_no_hits() {
    let query = Query::parse("late fine", &SynonymTable::builtin());
    let r = run_query(
        &FixedEmbedder(vec![0.6, 0.8, 0.0, 0.0]),
        &query,
        HybridPolicy::default(),
        0,
    );
    assert!(r.hits.is_empty());
    assert_eq!(r.state, RetrievalState::Empty);
    assert_eq!(r.vector_calls, 0);
    assert_eq!(r.lexical_calls, 0);
}
