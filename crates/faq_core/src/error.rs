use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes shared by the core and the collaborator clients.
///
/// `EMBEDDING_UNAVAILABLE` and `GENERATION_UNAVAILABLE` are always recovered inside the
/// pipeline. `EMPTY_KNOWLEDGE_BASE` is fatal at startup.
pub mod codes {
    pub const EMBEDDING_UNAVAILABLE: &str = "EMBEDDING_UNAVAILABLE";
    pub const GENERATION_UNAVAILABLE: &str = "GENERATION_UNAVAILABLE";
    pub const EMPTY_KNOWLEDGE_BASE: &str = "EMPTY_KNOWLEDGE_BASE";
    pub const KB_LOAD_FAILED: &str = "KB_LOAD_FAILED";
    pub const KB_INVALID: &str = "KB_INVALID";
    pub const CONFIG_LOAD_FAILED: &str = "CONFIG_LOAD_FAILED";
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";
    pub const OLLAMA_URL_INVALID: &str = "OLLAMA_URL_INVALID";
    pub const OLLAMA_UNHEALTHY: &str = "OLLAMA_UNHEALTHY";
    pub const OLLAMA_UNREACHABLE: &str = "OLLAMA_UNREACHABLE";
}

/// Single structured error shape used across the core, the collaborator clients and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}
