use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Provider, ProviderError, Summarizer, SummaryRequest, status_error};

const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Anthropic messages API: the prompt is the system instruction, the page text the user message.
#[derive(Debug, Clone, Default)]
pub struct Claude {
    client: reqwest::Client,
}

impl Claude {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn endpoint(request: &SummaryRequest) -> String {
        let base = request
            .ai_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/');
        format!("{base}/v1/messages")
    }
}

pub(crate) fn request_body(request: &SummaryRequest) -> Value {
    json!({
        "model": request.model_or(Provider::Claude.default_model()),
        "max_tokens": MAX_TOKENS,
        "system": request.prompt,
        "messages": [{ "role": "user", "content": request.text }]
    })
}

/// Joins every `text` block of the response.
pub(crate) fn response_text(response: &Value) -> String {
    response["content"]
        .as_array()
        .map(|blocks| {
            blocks
                .iter()
                .filter(|block| block["type"] == "text")
                .filter_map(|block| block["text"].as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[async_trait]
impl Summarizer for Claude {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(Self::endpoint(request))
            .header("x-api-key", &request.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(Provider::Claude, response).await);
        }

        let json: Value = response.json().await?;
        Ok(response_text(&json))
    }
}
