use faq_core::config::AnswerConfig;
use faq_core::domain::{Answer, AnswerKind, Citation, Confidence, Context};
use faq_core::error::{codes, AppError};
use faq_core::fallback::{format_fallback, insufficient_answer};
use faq_core::query::Query;

use crate::guardrails::{enforce_citations, strip_citation_markers};
use crate::llm::Llm;

mod prompts;

pub use prompts::{answer_prompt, context_blocks};

/// Turns an assembled context into the final answer, preferring the generation
/// collaborator and falling back to the deterministic formatter.
pub struct AnswerComposer<'a> {
    llm: &'a dyn Llm,
    model: &'a str,
    min_words: u32,
    max_words: u32,
    similarity_threshold: f32,
}

impl<'a> AnswerComposer<'a> {
    pub fn new(llm: &'a dyn Llm, model: &'a str) -> Self {
        let defaults = AnswerConfig::default();
        Self {
            llm,
            model,
            min_words: defaults.min_words,
            max_words: defaults.max_words,
            similarity_threshold: 0.3,
        }
    }

    pub fn with_word_range(mut self, min_words: u32, max_words: u32) -> Self {
        self.min_words = min_words;
        self.max_words = max_words;
        self
    }

    pub fn with_threshold(mut self, similarity_threshold: f32) -> Self {
        self.similarity_threshold = similarity_threshold;
        self
    }

    pub fn prompt(&self, query: &Query, context: &Context) -> String {
        answer_prompt(
            &query.raw,
            &context_blocks(context),
            self.min_words,
            self.max_words,
        )
    }

    /// Never fails. An empty context yields the fixed insufficient-information answer.
    pub fn compose(&self, query: &Query, context: &Context, top_score: Option<f32>) -> Answer {
        if context.is_empty() {
            return insufficient_answer(top_score);
        }
        let confidence = Confidence::from_top_score(top_score, self.similarity_threshold);

        match self.generate(query, context) {
            Ok((text, sources)) => Answer {
                text,
                sources,
                confidence,
                top_score,
                kind: AnswerKind::Generated,
            },
            Err(e) => {
                tracing::warn!(
                    code = %e.code,
                    error = %e,
                    "generation unavailable; using fallback answer"
                );
                self.fallback(query, context, top_score)
            }
        }
    }

    /// Deterministic answer built from `context` alone.
    pub fn fallback(&self, query: &Query, context: &Context, top_score: Option<f32>) -> Answer {
        if context.is_empty() {
            return insufficient_answer(top_score);
        }
        Answer {
            text: format_fallback(&query.raw, context),
            sources: context.citations(),
            confidence: Confidence::from_top_score(top_score, self.similarity_threshold),
            top_score,
            kind: AnswerKind::Fallback,
        }
    }

    fn generate(
        &self,
        query: &Query,
        context: &Context,
    ) -> Result<(String, Vec<Citation>), AppError> {
        let prompt = self.prompt(query, context);
        let output = self.llm.generate(self.model, &prompt)?;
        let cited = enforce_citations(&output, context)?;

        let text = strip_citation_markers(&output);
        if text.is_empty() {
            return Err(AppError::new(
                codes::GENERATION_UNAVAILABLE,
                "Generated answer contained only citation markers",
            ));
        }

        let citations = context.citations();
        let sources = if cited.is_empty() {
            citations
        } else {
            citations
                .into_iter()
                .filter(|c| cited.contains(&c.chunk_id))
                .collect()
        };
        Ok((text, sources))
    }
}
