pub mod answer;
pub mod assistant;
pub mod embeddings;
pub mod guardrails;
pub mod hybrid;
pub mod llm;
pub mod ollama;
pub mod retrieve;

pub use assistant::Assistant;
