use std::time::Duration;

use faq_core::error::{codes, AppError};
use serde::{Deserialize, Serialize};

use super::Embedder;
use crate::ollama::OllamaClient;

// Queries are short; anything longer is cut at a char boundary.
const MAX_INPUT_CHARS: usize = 4_000;

#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: OllamaClient,
    timeout: Duration,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

fn unavailable(message: &str) -> AppError {
    AppError::new(codes::EMBEDDING_UNAVAILABLE, message)
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, AppError> {
        let prompt = match input.char_indices().nth(MAX_INPUT_CHARS) {
            Some((cut, _)) => &input[..cut],
            None => input,
        };

        let url = format!("{}/api/embeddings", self.client.base_url());
        let req = EmbeddingsRequest { model, prompt };
        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(serde_json::to_value(req).map_err(|e| {
                unavailable("Failed to encode embeddings request").with_details(e.to_string())
            })?);

        match resp {
            Ok(r) if r.status() == 200 => {
                let v: EmbeddingsResponse = r.into_json().map_err(|e| {
                    unavailable("Failed to decode embeddings response").with_details(e.to_string())
                })?;
                if v.embedding.is_empty() {
                    return Err(unavailable("Embeddings response was empty"));
                }
                Ok(v.embedding)
            }
            Ok(r) => Err(unavailable("Embeddings request failed")
                .with_details(format!("status={}", r.status()))),
            Err(ureq::Error::Status(status, _)) => Err(unavailable("Embeddings request failed")
                .with_details(format!("status={status}"))
                .with_retryable(status >= 500)),
            Err(e) => Err(unavailable("Failed to call embeddings endpoint")
                .with_details(e.to_string())
                .with_retryable(true)),
        }
    }
}
