use serde::{Deserialize, Serialize};

use crate::text::{normalize, SynonymTable};

/// A single user question, normalized and expanded. Lives for one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Query {
    pub raw: String,
    pub tokens: Vec<String>,
    /// `tokens` followed by appended synonym terms.
    pub expanded: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Query {
    pub fn parse(raw: &str, synonyms: &SynonymTable) -> Self {
        let tokens = normalize(raw);
        let expanded = synonyms.expand(&tokens);
        Self {
            raw: raw.trim().to_string(),
            tokens,
            expanded,
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Terms added by expansion, in the order they were appended.
    pub fn expansion_terms(&self) -> &[String] {
        &self.expanded[self.tokens.len()..]
    }

    /// Text sent to the embedding collaborator: the raw question plus expansion terms.
    pub fn expanded_text(&self) -> String {
        let extra = self.expansion_terms();
        if extra.is_empty() {
            self.raw.clone()
        } else {
            format!("{} {}", self.raw, extra.join(" "))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_and_expands() {
        let raw = "  What is the library fine for late books?  ";
        let q = Query::parse(raw, &SynonymTable::builtin());
        assert_eq!(q.raw, "What is the library fine for late books?");
        assert_eq!(q.tokens, vec!["library", "fine", "late", "books"]);
        assert!(q.expansion_terms().contains(&"media".to_string()));
        assert!(q
            .expanded_text()
            .starts_with("What is the library fine for late books? media center"));
    }

    #[test]
    fn no_expansion_keeps_raw_text() {
        let q = Query::parse("semester start", &SynonymTable::empty());
        assert_eq!(q.expanded_text(), "semester start");
        assert!(q.expansion_terms().is_empty());
        assert!(Query::parse("?!", &SynonymTable::empty()).is_empty());
    }
}
