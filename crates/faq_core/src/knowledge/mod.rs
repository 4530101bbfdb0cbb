use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::Chunk;
use crate::error::{codes, AppError};
use crate::lexical::LexicalIndex;

pub mod snapshot;

pub use snapshot::{load_snapshot, SnapshotFile, SnapshotRecord};

/// Read-only collection of chunks plus the indexes built over them.
///
/// Built once at startup and shared by reference across concurrent queries; nothing in
/// the query path takes `&mut self`.
#[derive(Debug)]
pub struct KnowledgeBase {
    chunks: Vec<Chunk>,
    norms: Vec<f32>,
    positions: BTreeMap<u64, usize>,
    dims: usize,
    lexicon: LexicalIndex,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnowledgeBaseStats {
    pub chunk_count: u32,
    pub dims: u32,
    pub sources: Vec<String>,
    pub vocabulary_size: u32,
}

impl KnowledgeBase {
    pub fn new(chunks: Vec<Chunk>) -> Result<Self, AppError> {
        if chunks.is_empty() {
            return Err(AppError::new(
                codes::EMPTY_KNOWLEDGE_BASE,
                "Knowledge base has no chunks; refusing to serve queries",
            ));
        }

        let dims = chunks[0].embedding.len();
        let mut positions = BTreeMap::new();
        let mut norms = Vec::with_capacity(chunks.len());

        for (pos, chunk) in chunks.iter().enumerate() {
            if positions.insert(chunk.id, pos).is_some() {
                return Err(AppError::new(codes::KB_INVALID, "Duplicate chunk id")
                    .with_details(format!("chunk_id={}", chunk.id)));
            }
            if chunk.embedding.is_empty() {
                return Err(AppError::new(codes::KB_INVALID, "Chunk embedding is empty")
                    .with_details(format!("chunk_id={}", chunk.id)));
            }
            if chunk.embedding.len() != dims {
                return Err(AppError::new(
                    codes::KB_INVALID,
                    "Embedding dimension mismatch across chunks",
                )
                .with_details(format!(
                    "expected={}; got={}; chunk_id={}",
                    dims,
                    chunk.embedding.len(),
                    chunk.id
                )));
            }
            if chunk.embedding.iter().any(|x| !x.is_finite()) {
                return Err(AppError::new(
                    codes::KB_INVALID,
                    "Chunk embedding contains non-finite values",
                )
                .with_details(format!("chunk_id={}", chunk.id)));
            }
            norms.push(l2_norm(&chunk.embedding));
        }

        let lexicon = LexicalIndex::build(&chunks);
        tracing::info!(
            chunks = chunks.len(),
            dims,
            vocabulary = lexicon.vocabulary_size(),
            "knowledge base loaded"
        );

        Ok(Self {
            chunks,
            norms,
            positions,
            dims,
            lexicon,
        })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Always false for a constructed knowledge base; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn get(&self, id: u64) -> Option<&Chunk> {
        self.positions.get(&id).map(|&pos| &self.chunks[pos])
    }

    pub fn contains(&self, id: u64) -> bool {
        self.positions.contains_key(&id)
    }

    /// Chunks paired with their precomputed embedding norms.
    pub fn vectors(&self) -> impl Iterator<Item = (&Chunk, f32)> + '_ {
        self.chunks.iter().zip(self.norms.iter().copied())
    }

    pub fn lexicon(&self) -> &LexicalIndex {
        &self.lexicon
    }

    pub fn stats(&self) -> KnowledgeBaseStats {
        let sources: BTreeSet<&str> = self.chunks.iter().map(|c| c.source.as_str()).collect();
        KnowledgeBaseStats {
            chunk_count: self.chunks.len().min(u32::MAX as usize) as u32,
            dims: self.dims.min(u32::MAX as usize) as u32,
            sources: sources.into_iter().map(str::to_string).collect(),
            vocabulary_size: self.lexicon.vocabulary_size().min(u32::MAX as usize) as u32,
        }
    }
}

pub fn l2_norm(v: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    for x in v {
        sum += x * x;
    }
    sum.sqrt()
}
