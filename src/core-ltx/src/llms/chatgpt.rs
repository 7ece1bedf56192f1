use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

use super::{Provider, ProviderError, Summarizer, SummaryRequest};

/// OpenAI chat completions: the prompt is the system message, the page text the user message.
#[derive(Debug, Clone, Default)]
pub struct ChatGpt;

impl ChatGpt {
    fn client(request: &SummaryRequest) -> Client<OpenAIConfig> {
        let mut config = OpenAIConfig::new().with_api_key(request.api_key.clone());
        if let Some(api_base) = request.ai_url.as_deref().filter(|url| !url.trim().is_empty()) {
            config = config.with_api_base(api_base.trim_end_matches('/'));
        }
        Client::with_config(config)
    }
}

#[async_trait]
impl Summarizer for ChatGpt {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, ProviderError> {
        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(request.model_or(Provider::OpenAi.default_model()))
            .temperature(0.5)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.prompt.as_str())
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.text.as_str())
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = Self::client(request).chat().create(chat_request).await?;

        Ok(response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(|content| content.trim().to_string())
            .unwrap_or_default())
    }
}
