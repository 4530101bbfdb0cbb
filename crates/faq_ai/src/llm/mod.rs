use faq_core::error::AppError;

/// Text generation collaborator. Failures carry `GENERATION_UNAVAILABLE`.
pub trait Llm: Send + Sync {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError>;
}

pub mod ollama_llm;

pub use ollama_llm::OllamaLlm;
