use async_trait::async_trait;
use serde_json::{Map, Value, json};

use super::{Provider, ProviderError, Summarizer, SummaryRequest, combined_message, status_error};
use crate::config::ThinkingConfig;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Google Gemini `generateContent`: prompt and text travel as one content part.
#[derive(Debug, Clone, Default)]
pub struct Gemini {
    client: reqwest::Client,
}

impl Gemini {
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
        let model = request.model_or(Provider::Gemini.default_model());
        format!("{base}/v1beta/models/{model}:generateContent")
    }
}

pub(crate) fn request_body(request: &SummaryRequest) -> Value {
    let mut body = json!({
        "contents": [{
            "parts": [{ "text": combined_message(request) }]
        }]
    });
    if let Some(thinking) = thinking_config(&request.thinking) {
        body["generationConfig"] = json!({ "thinkingConfig": thinking });
    }
    body
}

fn thinking_config(thinking: &ThinkingConfig) -> Option<Value> {
    if thinking.is_empty() {
        return None;
    }
    let mut config = Map::new();
    if let Some(level) = &thinking.level {
        config.insert("thinkingLevel".to_string(), json!(level));
    }
    if let Some(budget) = thinking.budget {
        config.insert("thinkingBudget".to_string(), json!(budget));
    }
    Some(Value::Object(config))
}

/// Concatenates the text parts of the first candidate.
pub(crate) fn response_text(response: &Value) -> String {
    response["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[async_trait]
impl Summarizer for Gemini {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(Self::endpoint(request))
            .header("x-goog-api-key", &request.api_key)
            .json(&request_body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(Provider::Gemini, response).await);
        }

        let json: Value = response.json().await?;
        Ok(response_text(&json))
    }
}
