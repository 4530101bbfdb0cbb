use serde::{Deserialize, Serialize};

/// Immutable unit of indexed text, produced by external ingestion.
///
/// Notes:
/// - `embedding` has the knowledge base's fixed dimensionality.
/// - Chunks are never mutated or deleted once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub id: u64,
    pub text: String,
    pub source: String,
    pub page: Option<u32>,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Vector,
    Lexical,
}

/// One chunk scored by one retrieval strategy. `rank` is the 0-based position in that
/// strategy's result list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalHit {
    pub chunk_id: u64,
    pub score: f32,
    pub strategy: Strategy,
    pub rank: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentenceHit {
    pub text: String,
    pub score: f32,
    pub chunk_id: u64,
    pub source: String,
    pub page: Option<u32>,
    // Stable ordering key: (hit_rank, sentence_index).
    pub hit_rank: u32,
    pub sentence_index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    pub chunk_id: u64,
    pub source: String,
    pub page: Option<u32>,
}

impl Citation {
    /// Human-readable label, e.g. `Student Handbook, p. 12`.
    pub fn label(&self) -> String {
        match self.page {
            Some(page) => format!("{}, p. {}", self.source, page),
            None => self.source.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextEntry {
    /// 1-based position, used as the entry number in prompts and fallback bullets.
    pub index: u32,
    pub text: String,
    pub score: f32,
    pub citation: Citation,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Context {
    pub entries: Vec<ContextEntry>,
}

impl Context {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn chunk_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = Vec::new();
        for e in &self.entries {
            if !ids.contains(&e.citation.chunk_id) {
                ids.push(e.citation.chunk_id);
            }
        }
        ids
    }

    /// Citations in entry order, one per distinct chunk.
    pub fn citations(&self) -> Vec<Citation> {
        let mut out: Vec<Citation> = Vec::new();
        for e in &self.entries {
            if !out.iter().any(|c| c.chunk_id == e.citation.chunk_id) {
                out.push(e.citation.clone());
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Low,
}

impl Confidence {
    pub fn from_top_score(top_score: Option<f32>, threshold: f32) -> Self {
        match top_score {
            Some(s) if s >= threshold => Confidence::High,
            _ => Confidence::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    Generated,
    Fallback,
    InsufficientContext,
    SmallTalk,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<Citation>,
    pub confidence: Confidence,
    pub top_score: Option<f32>,
    pub kind: AnswerKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: u32, chunk_id: u64) -> ContextEntry {
        ContextEntry {
            index,
            text: format!("sentence {index}"),
            score: 1.0,
            citation: Citation {
                chunk_id,
                source: "handbook.pdf".to_string(),
                page: Some(3),
            },
        }
    }

    #[test]
    fn context_citations_are_distinct_and_ordered() {
        let ctx = Context {
            entries: vec![entry(1, 7), entry(2, 3), entry(3, 7)],
        };
        assert_eq!(ctx.chunk_ids(), vec![7, 3]);
        let cites = ctx.citations();
        assert_eq!(cites.len(), 2);
        assert_eq!(cites[0].label(), "handbook.pdf, p. 3");
    }

    #[test]
    fn confidence_follows_threshold() {
        assert_eq!(Confidence::from_top_score(Some(0.3), 0.3), Confidence::High);
        assert_eq!(Confidence::from_top_score(Some(0.29), 0.3), Confidence::Low);
        assert_eq!(Confidence::from_top_score(None, 0.3), Confidence::Low);
    }
}
