use faq_core::domain::{RetrievalHit, Strategy};
use faq_core::error::{codes, AppError};
use faq_core::knowledge::{l2_norm, KnowledgeBase};
use faq_core::query::Query;

use crate::embeddings::Embedder;

mod similarity;

pub use similarity::cosine_similarity;

pub const DEFAULT_TOP_K: usize = 8;

/// Semantic search over the knowledge base. Errors carry `EMBEDDING_UNAVAILABLE`.
pub trait VectorSearch {
    fn search(&self, query: &Query, top_k: usize) -> Result<Vec<RetrievalHit>, AppError>;
}

pub struct VectorRetriever<'a> {
    kb: &'a KnowledgeBase,
    embedder: &'a dyn Embedder,
    model: &'a str,
}

impl<'a> VectorRetriever<'a> {
    pub fn new(kb: &'a KnowledgeBase, embedder: &'a dyn Embedder, model: &'a str) -> Self {
        Self {
            kb,
            embedder,
            model,
        }
    }

    fn query_vector(&self, query: &Query) -> Result<Vec<f32>, AppError> {
        let qv = match &query.embedding {
            Some(v) => v.clone(),
            None => self.embedder.embed(self.model, &query.expanded_text())?,
        };
        if qv.is_empty() {
            return Err(AppError::new(
                codes::EMBEDDING_UNAVAILABLE,
                "Query embedding was empty",
            ));
        }
        if qv.len() != self.kb.dims() {
            return Err(AppError::new(
                codes::EMBEDDING_UNAVAILABLE,
                "Query embedding dims do not match knowledge base dims",
            )
            .with_details(format!("kb_dims={}; query_dims={}", self.kb.dims(), qv.len())));
        }
        if qv.iter().any(|x| !x.is_finite()) {
            return Err(AppError::new(
                codes::EMBEDDING_UNAVAILABLE,
                "Query embedding contains non-finite values",
            ));
        }
        Ok(qv)
    }
}

impl VectorSearch for VectorRetriever<'_> {
    fn search(&self, query: &Query, top_k: usize) -> Result<Vec<RetrievalHit>, AppError> {
        let qv = self.query_vector(query)?;
        let qnorm = l2_norm(&qv);
        if qnorm == 0.0 {
            tracing::debug!("query embedding norm is zero; no vector hits");
            return Ok(Vec::new());
        }

        let mut hits: Vec<(u64, f32)> = Vec::with_capacity(self.kb.len());
        for (chunk, vnorm) in self.kb.vectors() {
            if vnorm == 0.0 {
                continue;
            }
            let score = cosine_similarity(&qv, &chunk.embedding, qnorm, vnorm);
            hits.push((chunk.id, score));
        }

        hits.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        hits.truncate(top_k);

        tracing::debug!(hits = hits.len(), "vector search complete");
        Ok(hits
            .into_iter()
            .enumerate()
            .map(|(rank, (chunk_id, score))| RetrievalHit {
                chunk_id,
                score,
                strategy: Strategy::Vector,
                rank: rank as u32,
            })
            .collect())
    }
}
