#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use faq_ai::embeddings::Embedder;
use faq_ai::llm::Llm;
use faq_core::error::{codes, AppError};
use faq_core::knowledge::{load_snapshot, KnowledgeBase};

pub const SCENARIO_QUERY: &str = "What is the library fine for late books?";

pub fn campus_kb() -> KnowledgeBase {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/kb/campus_faq.json");
    load_snapshot(&path).expect("load fixture")
}

/// Returns the same vector for every input.
pub struct FixedEmbedder(pub Vec<f32>);

impl Embedder for FixedEmbedder {
    fn embed(&self, _model: &str, _input: &str) -> Result<Vec<f32>, AppError> {
        Ok(self.0.clone())
    }
}

pub struct DownEmbedder;

impl Embedder for DownEmbedder {
    fn embed(&self, _model: &str, _input: &str) -> Result<Vec<f32>, AppError> {
        Err(AppError::new(codes::EMBEDDING_UNAVAILABLE, "connection refused").with_retryable(true))
    }
}

/// Records every prompt and always fails.
#[derive(Clone, Default)]
pub struct RecordingDownLlm {
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl Llm for RecordingDownLlm {
    fn generate(&self, _model: &str, prompt: &str) -> Result<String, AppError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Err(AppError::new(codes::GENERATION_UNAVAILABLE, "timed out").with_retryable(true))
    }
}

/// Echoes a fixed reply.
pub struct CannedLlm(pub String);

impl Llm for CannedLlm {
    fn generate(&self, _model: &str, _prompt: &str) -> Result<String, AppError> {
        Ok(self.0.clone())
    }
}
