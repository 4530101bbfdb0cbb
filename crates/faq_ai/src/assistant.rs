use std::sync::Arc;
use std::time::Duration;

use faq_core::config::AssistantConfig;
use faq_core::context::ContextAssembler;
use faq_core::domain::{Answer, Context, RetrievalHit};
use faq_core::error::AppError;
use faq_core::knowledge::KnowledgeBase;
use faq_core::lexical::LexicalSearcher;
use faq_core::query::Query;
use faq_core::rank::SentenceRanker;
use faq_core::smalltalk::SmallTalk;
use faq_core::text::SynonymTable;

use crate::answer::AnswerComposer;
use crate::embeddings::{Embedder, OllamaEmbedder};
use crate::hybrid::{HybridPolicy, HybridRetriever, RetrievalOutcome};
use crate::llm::{Llm, OllamaLlm};
use crate::ollama::OllamaClient;
use crate::retrieve::VectorRetriever;

/// Query entry point. Holds only immutable state, so one instance serves concurrent
/// queries through `&self`.
pub struct Assistant {
    kb: Arc<KnowledgeBase>,
    embedder: Box<dyn Embedder>,
    llm: Box<dyn Llm>,
    config: AssistantConfig,
    synonyms: SynonymTable,
}

impl Assistant {
    pub fn new(
        kb: Arc<KnowledgeBase>,
        embedder: Box<dyn Embedder>,
        llm: Box<dyn Llm>,
        config: AssistantConfig,
    ) -> Self {
        let synonyms = config.synonym_table();
        Self {
            kb,
            embedder,
            llm,
            config,
            synonyms,
        }
    }

    /// Wire the Ollama embedding and generation clients from `config.ollama`.
    pub fn with_ollama(kb: Arc<KnowledgeBase>, config: AssistantConfig) -> Result<Self, AppError> {
        let client = OllamaClient::new(&config.ollama.base_url)?;
        let embedder = OllamaEmbedder::new(
            client.clone(),
            Duration::from_millis(config.ollama.embed_timeout_ms),
        );
        let llm = OllamaLlm::new(client, Duration::from_millis(config.ollama.generate_timeout_ms));
        Ok(Self::new(kb, Box::new(embedder), Box::new(llm), config))
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn parse_query(&self, raw: &str) -> Query {
        Query::parse(raw, &self.synonyms)
    }

    /// Hybrid retrieval with the state reached, for diagnostics.
    pub fn retrieve(&self, raw: &str, top_k: usize) -> RetrievalOutcome {
        let query = self.parse_query(raw);
        self.retrieve_query(&query, top_k)
    }

    /// Ranked hits from the hybrid chain. Never fails; an empty vec means nothing matched.
    pub fn search(&self, raw: &str, top_k: usize) -> Vec<RetrievalHit> {
        self.retrieve(raw, top_k).hits
    }

    pub fn assemble_context(&self, raw: &str) -> (RetrievalOutcome, Context) {
        let query = self.parse_query(raw);
        self.context_for(&query)
    }

    /// Full pipeline. Never fails: collaborator errors degrade to lexical retrieval and
    /// the deterministic answer formatter.
    pub fn generate_response(&self, raw: &str) -> Answer {
        if self.config.answer.smalltalk {
            if let Some(kind) = SmallTalk::detect(raw) {
                tracing::debug!(?kind, "small talk reply");
                return kind.answer();
            }
        }

        let query = self.parse_query(raw);
        let (outcome, context) = self.context_for(&query);
        let composer = AnswerComposer::new(self.llm.as_ref(), &self.config.ollama.generate_model)
            .with_word_range(self.config.answer.min_words, self.config.answer.max_words)
            .with_threshold(self.config.retrieval.similarity_threshold);
        let answer = composer.compose(&query, &context, outcome.top_score);

        tracing::info!(
            state = ?outcome.state,
            hits = outcome.hits.len(),
            entries = context.len(),
            kind = ?answer.kind,
            "answer composed"
        );
        answer
    }

    fn retrieve_query(&self, query: &Query, top_k: usize) -> RetrievalOutcome {
        let vector = VectorRetriever::new(
            &self.kb,
            self.embedder.as_ref(),
            &self.config.ollama.embed_model,
        );
        let lexical = LexicalSearcher::new(&self.kb);
        HybridRetriever::new(vector, lexical, HybridPolicy::from(&self.config.retrieval))
            .retrieve(query, top_k)
    }

    fn context_for(&self, query: &Query) -> (RetrievalOutcome, Context) {
        let outcome = self.retrieve_query(query, self.config.retrieval.vector_top_k);
        if outcome.hits.is_empty() {
            return (outcome, Context::default());
        }
        let sentences = SentenceRanker::new(&self.kb)
            .with_config(self.config.ranking.clone())
            .extract(query, &outcome.hits, self.config.ranking.max_sentences);
        let context = ContextAssembler::new(self.config.context.char_budget).assemble(&sentences);
        (outcome, context)
    }
}
