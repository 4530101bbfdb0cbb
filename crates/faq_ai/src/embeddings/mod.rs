use faq_core::error::AppError;

/// Turns text into a fixed-dimension vector. Failures carry `EMBEDDING_UNAVAILABLE`.
pub trait Embedder: Send + Sync {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, AppError>;
}

pub mod ollama_embed;

pub use ollama_embed::OllamaEmbedder;
