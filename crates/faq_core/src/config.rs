//! Assistant configuration with layered resolution.
//!
//! Resolution order (highest priority first):
//! 1. Environment variables (`FAQ_OLLAMA_URL`, `FAQ_EMBED_MODEL`, `FAQ_GENERATE_MODEL`)
//! 2. TOML config file, when one is given
//! 3. Compiled defaults

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{codes, AppError};
use crate::text::SynonymTable;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AssistantConfig {
    pub retrieval: RetrievalConfig,
    pub ranking: RankingConfig,
    pub context: ContextConfig,
    pub answer: AnswerConfig,
    pub ollama: OllamaConfig,
    pub expansion: ExpansionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    pub vector_top_k: usize,
    pub lexical_max_results: usize,
    /// Minimum top cosine score for vector hits to be used without lexical fallback.
    pub similarity_threshold: f32,
    /// Also run lexical search after a passing vector attempt and merge when both pass.
    pub lexical_supplement: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            vector_top_k: 8,
            lexical_max_results: 5,
            similarity_threshold: 0.3,
            lexical_supplement: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RankingConfig {
    pub max_sentences: usize,
    pub rank_penalty: f32,
    pub relevance_per_term: f32,
    pub relevance_cap: f32,
    pub duplicate_overlap: f32,
    pub min_sentence_chars: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_sentences: 4,
            rank_penalty: 0.05,
            relevance_per_term: 0.1,
            relevance_cap: 0.5,
            duplicate_overlap: 0.9,
            min_sentence_chars: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContextConfig {
    pub char_budget: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self { char_budget: 2400 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnswerConfig {
    pub min_words: u32,
    pub max_words: u32,
    pub smalltalk: bool,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            min_words: 80,
            max_words: 200,
            smalltalk: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub embed_model: String,
    pub generate_model: String,
    pub embed_timeout_ms: u64,
    pub generate_timeout_ms: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "llama3.1".to_string(),
            embed_timeout_ms: 3_000,
            generate_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Extra phrase → related terms entries, merged into the built-in table at load time.
    pub synonyms: BTreeMap<String, Vec<String>>,
}

impl AssistantConfig {
    /// Load from an optional TOML file, apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(codes::CONFIG_LOAD_FAILED, "Failed to read config file")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            AppError::new(codes::CONFIG_LOAD_FAILED, "Failed to parse config file")
                .with_details(format!("path={}; err={}", path.display(), e))
        })
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, AppError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| {
            AppError::new(codes::CONFIG_LOAD_FAILED, "Failed to parse config")
                .with_details(e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `FAQ_*` overrides. The lookup is injected so tests need not touch the process env.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("FAQ_OLLAMA_URL").filter(|v| !v.trim().is_empty()) {
            self.ollama.base_url = v;
        }
        if let Some(v) = lookup("FAQ_EMBED_MODEL").filter(|v| !v.trim().is_empty()) {
            self.ollama.embed_model = v;
        }
        if let Some(v) = lookup("FAQ_GENERATE_MODEL").filter(|v| !v.trim().is_empty()) {
            self.ollama.generate_model = v;
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let unit = |field: &str, v: f32| -> Result<(), AppError> {
            if !(0.0..=1.0).contains(&v) {
                return Err(invalid(field, "must be between 0.0 and 1.0"));
            }
            Ok(())
        };
        unit("retrieval.similarity_threshold", self.retrieval.similarity_threshold)?;
        unit("ranking.rank_penalty", self.ranking.rank_penalty)?;
        unit("ranking.relevance_per_term", self.ranking.relevance_per_term)?;
        unit("ranking.relevance_cap", self.ranking.relevance_cap)?;
        unit("ranking.duplicate_overlap", self.ranking.duplicate_overlap)?;

        if self.retrieval.vector_top_k == 0 {
            return Err(invalid("retrieval.vector_top_k", "must be greater than 0"));
        }
        if self.retrieval.lexical_max_results == 0 {
            return Err(invalid("retrieval.lexical_max_results", "must be greater than 0"));
        }
        if !(1..=6).contains(&self.ranking.max_sentences) {
            return Err(invalid("ranking.max_sentences", "must be between 1 and 6"));
        }
        if self.context.char_budget == 0 {
            return Err(invalid("context.char_budget", "must be greater than 0"));
        }
        if self.answer.min_words == 0 || self.answer.min_words > self.answer.max_words {
            return Err(invalid(
                "answer.min_words",
                "must be greater than 0 and not exceed answer.max_words",
            ));
        }
        if self.ollama.embed_timeout_ms == 0 || self.ollama.generate_timeout_ms == 0 {
            return Err(invalid("ollama", "timeouts must be greater than 0"));
        }
        if self.ollama.embed_timeout_ms >= self.ollama.generate_timeout_ms {
            return Err(invalid(
                "ollama.embed_timeout_ms",
                "must be lower than ollama.generate_timeout_ms",
            ));
        }
        Ok(())
    }

    pub fn synonym_table(&self) -> SynonymTable {
        SynonymTable::with_extra(self.expansion.synonyms.iter())
    }
}

fn invalid(field: &str, message: &str) -> AppError {
    AppError::new(codes::CONFIG_INVALID, format!("Invalid config value for {field}"))
        .with_details(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_match_policy_constants() {
        let c = AssistantConfig::default();
        c.validate().expect("defaults valid");
        assert_eq!(c.retrieval.vector_top_k, 8);
        assert_eq!(c.retrieval.lexical_max_results, 5);
        assert_eq!(c.retrieval.similarity_threshold, 0.3);
        assert_eq!(c.ranking.rank_penalty, 0.05);
        assert_eq!(c.ranking.max_sentences, 4);
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_keys() {
        let c = AssistantConfig::from_toml(
            r#"
[retrieval]
similarity_threshold = 0.4

[ranking]
max_sentences = 6

[expansion.synonyms]
bursar = ["billing", "payments"]
"#,
        )
        .expect("parse");
        assert_eq!(c.retrieval.similarity_threshold, 0.4);
        assert_eq!(c.retrieval.vector_top_k, 8);
        assert_eq!(c.ranking.max_sentences, 6);
        assert_eq!(c.context, ContextConfig::default());
        assert_eq!(
            c.synonym_table().expand(&["bursar".to_string()]),
            vec!["bursar", "billing", "payments"]
        );
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        for (src, field) in [
            ("[retrieval]\nsimilarity_threshold = 1.5", "retrieval.similarity_threshold"),
            ("[ranking]\nmax_sentences = 7", "ranking.max_sentences"),
            ("[answer]\nmin_words = 300", "answer.min_words"),
            (
                "[ollama]\nembed_timeout_ms = 40000\ngenerate_timeout_ms = 30000",
                "ollama.embed_timeout_ms",
            ),
        ] {
            let err = AssistantConfig::from_toml(src).unwrap_err();
            assert_eq!(err.code, codes::CONFIG_INVALID, "{src}");
            assert!(err.message.contains(field), "{}", err.message);
        }
    }

    #[test]
    fn env_overrides_replace_ollama_settings() {
        let mut c = AssistantConfig::default();
        c.apply_env_overrides(|key| match key {
            "FAQ_OLLAMA_URL" => Some("http://10.0.0.5:11434".to_string()),
            "FAQ_GENERATE_MODEL" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(c.ollama.base_url, "http://10.0.0.5:11434");
        assert_eq!(c.ollama.generate_model, "llama3.1");
    }

    #[test]
    fn malformed_toml_is_a_load_error() {
        let err = AssistantConfig::from_toml("[retrieval\n").unwrap_err();
        assert_eq!(err.code, codes::CONFIG_LOAD_FAILED);
    }
}
