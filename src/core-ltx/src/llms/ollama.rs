use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Provider, ProviderError, Summarizer, SummaryRequest, combined_message, status_error};
use crate::logging::Logger;

/// Environment variable holding the address of the local Ollama server.
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";
const DEFAULT_HOST: &str = "http://127.0.0.1:11434";

/// A single, non-streaming `/api/chat` call against a local Ollama server.
///
/// The gateway wraps this in [`Retrying`](super::Retrying) with [`RetryPolicy::local_model`](super::RetryPolicy::local_model).
pub struct Ollama {
    client: reqwest::Client,
    logger: Arc<dyn Logger>,
}

impl Ollama {
    pub fn new(client: reqwest::Client, logger: Arc<dyn Logger>) -> Self {
        Self { client, logger }
    }

    /// Endpoint override, else `$OLLAMA_HOST`, else the default local port.
    fn host(&self, request: &SummaryRequest) -> String {
        if let Some(url) = request.ai_url.as_deref().filter(|url| !url.trim().is_empty()) {
            return with_scheme(url);
        }
        match common_ltx::env_non_empty(OLLAMA_HOST_ENV) {
            Some(host) => {
                self.logger.debug(&format!("[OLLAMA] {OLLAMA_HOST_ENV}: {host}"));
                with_scheme(&host)
            }
            None => DEFAULT_HOST.to_string(),
        }
    }
}

/// `OLLAMA_HOST` is commonly given as a bare `host:port`.
fn with_scheme(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

pub(crate) fn request_body(request: &SummaryRequest) -> Value {
    json!({
        "model": request.model_or(Provider::Ollama.default_model()),
        "messages": [{ "role": "user", "content": combined_message(request) }],
        "stream": false
    })
}

#[async_trait]
impl Summarizer for Ollama {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, ProviderError> {
        let url = format!("{}/api/chat", self.host(request));
        let body = request_body(request);
        if request.debug {
            self.logger.debug(&format!(
                "[OLLAMA] POST {url} model={} input_length={}",
                body["model"],
                request.text.len()
            ));
        }

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(status_error(Provider::Ollama, response).await);
        }

        let json: Value = response.json().await?;
        if request.debug {
            self.logger.debug(&format!("[OLLAMA] Raw response: {json}"));
        }
        Ok(json["message"]["content"].as_str().unwrap_or_default().trim().to_string())
    }
}
