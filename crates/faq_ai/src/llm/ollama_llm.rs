use std::time::Duration;

use faq_core::error::{codes, AppError};
use serde::{Deserialize, Serialize};

use super::Llm;
use crate::ollama::OllamaClient;

#[derive(Debug, Clone)]
pub struct OllamaLlm {
    client: OllamaClient,
    timeout: Duration,
}

impl OllamaLlm {
    pub fn new(client: OllamaClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

fn unavailable(message: &str) -> AppError {
    AppError::new(codes::GENERATION_UNAVAILABLE, message)
}

impl Llm for OllamaLlm {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/api/generate", self.client.base_url());
        let req = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(serde_json::to_value(req).map_err(|e| {
                unavailable("Failed to encode generate request").with_details(e.to_string())
            })?);

        match resp {
            Ok(r) if r.status() == 200 => {
                let v: GenerateResponse = r.into_json().map_err(|e| {
                    unavailable("Failed to decode generate response").with_details(e.to_string())
                })?;
                if v.response.trim().is_empty() {
                    return Err(unavailable("Generate response was empty"));
                }
                Ok(v.response)
            }
            Ok(r) => Err(unavailable("Generate request failed")
                .with_details(format!("status={}", r.status()))),
            Err(ureq::Error::Status(status, _)) => Err(unavailable("Generate request failed")
                .with_details(format!("status={status}"))
                .with_retryable(status >= 500)),
            Err(e) => Err(unavailable("Failed to call generate endpoint")
                .with_details(e.to_string())
                .with_retryable(true)),
        }
    }
}
