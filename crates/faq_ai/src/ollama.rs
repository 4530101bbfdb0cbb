use std::time::Duration;

use faq_core::error::{codes, AppError};

const HEALTH_TIMEOUT: Duration = Duration::from_millis(800);

#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
}

impl OllamaClient {
    /// Create a client for an Ollama server at `scheme://host[:port]`.
    ///
    /// Paths, credentials and out-of-range ports are rejected so requests can only go to
    /// the `/api/*` endpoints of the configured host.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        validate_base_url(&base_url).map_err(|reason| {
            AppError::new(codes::OLLAMA_URL_INVALID, "Ollama base URL is not valid")
                .with_details(format!("base_url={base_url}; reason={reason}"))
        })?;
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health_check(&self) -> Result<(), AppError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = ureq::get(&url).timeout(HEALTH_TIMEOUT).call();

        match resp {
            Ok(r) if r.status() == 200 => Ok(()),
            Ok(r) => Err(
                AppError::new(codes::OLLAMA_UNHEALTHY, "Ollama health check failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(ureq::Error::Status(status, _)) => Err(
                AppError::new(codes::OLLAMA_UNHEALTHY, "Ollama health check failed")
                    .with_details(format!("status={status}")),
            ),
            Err(e) => Err(AppError::new(codes::OLLAMA_UNREACHABLE, "Failed to reach Ollama")
                .with_details(format!("base_url={}; err={}", self.base_url, e))
                .with_retryable(true)),
        }
    }
}

fn validate_base_url(base_url: &str) -> Result<(), &'static str> {
    let rest = base_url
        .strip_prefix("http://")
        .or_else(|| base_url.strip_prefix("https://"))
        .ok_or("scheme must be http or https")?;
    if rest.is_empty() {
        return Err("missing host");
    }
    if rest.contains(['/', '?', '#']) {
        return Err("path, query and fragment are not allowed");
    }
    if rest.contains('@') {
        return Err("credentials are not allowed");
    }

    let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
        let (inner, after) = bracketed.split_once(']').ok_or("unterminated IPv6 host")?;
        if inner.is_empty() {
            return Err("missing host");
        }
        match after {
            "" => (inner, None),
            p => (inner, Some(p.strip_prefix(':').ok_or("invalid port separator")?)),
        }
    } else {
        match rest.split_once(':') {
            Some((h, p)) => (h, Some(p)),
            None => (rest, None),
        }
    };

    if host.is_empty() {
        return Err("missing host");
    }
    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':'))
    {
        return Err("host contains invalid characters");
    }
    if let Some(p) = port {
        match p.parse::<u16>() {
            Ok(0) | Err(_) => return Err("port must be between 1 and 65535"),
            Ok(_) => {}
        }
    }
    Ok(())
}
