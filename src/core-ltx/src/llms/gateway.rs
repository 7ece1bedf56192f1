//! The single entry point for summaries: credential checks, cache, dispatch, error containment.

use std::{collections::HashMap, sync::Arc, time::Duration};

use super::{
    ChatGpt, Claude, CliCommand, Gemini, Ollama, Provider, ProviderError, RetryPolicy, Retrying, Summarizer,
    SummaryRequest,
};
use crate::{
    cache::{SummaryCache, fingerprint},
    logging::Logger,
};

/// Dispatches summary requests to the registered backend for their provider.
///
/// `generate_summary` never fails: a missing provider or credential, an unknown
/// provider, a backend error, a timeout and a cache failure all end in a logged
/// message and, where no summary could be had, an empty string.
pub struct AiGateway {
    summarizers: HashMap<Provider, Arc<dyn Summarizer>>,
    cache: Option<Arc<dyn SummaryCache>>,
    timeout: Option<Duration>,
    logger: Arc<dyn Logger>,
}

impl AiGateway {
    /// A gateway with every built-in backend registered and no cache.
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self::with_ollama_retry(logger, RetryPolicy::local_model())
    }

    /// Like [`new`](Self::new), with `policy` governing the Ollama retries.
    pub fn with_ollama_retry(logger: Arc<dyn Logger>, policy: RetryPolicy) -> Self {
        let client = reqwest::Client::new();
        let ollama = Retrying::new(
            Ollama::new(client.clone(), logger.clone()),
            policy,
            "OLLAMA",
            logger.clone(),
        );

        Self::empty(logger)
            .with_summarizer(Provider::OpenAi, ChatGpt)
            .with_summarizer(Provider::Gemini, Gemini::new(client.clone()))
            .with_summarizer(Provider::Claude, Claude::new(client))
            .with_summarizer(Provider::Ollama, ollama)
            .with_summarizer(Provider::Cli, CliCommand)
    }

    /// A gateway with no backends at all; register them with [`with_summarizer`](Self::with_summarizer).
    pub fn empty(logger: Arc<dyn Logger>) -> Self {
        Self {
            summarizers: HashMap::new(),
            cache: None,
            timeout: None,
            logger,
        }
    }

    /// Registers (or replaces) the backend for `provider`.
    pub fn with_summarizer(mut self, provider: Provider, summarizer: impl Summarizer + 'static) -> Self {
        self.summarizers.insert(provider, Arc::new(summarizer));
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn SummaryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Bounds every live call; an elapsed call counts as a provider failure.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns a summary for `request`, from the cache when possible, else from the backend.
    pub async fn generate_summary(&self, request: &SummaryRequest) -> String {
        let provider_name = request.provider.trim();
        let parsed = provider_name.parse::<Provider>();
        let needs_key = parsed.as_ref().map(Provider::requires_api_key).unwrap_or(true);

        if provider_name.is_empty() || (needs_key && request.api_key.trim().is_empty()) {
            self.logger
                .warn("No AI provider specified or API key missing! No AI summary will be generated.");
            return String::new();
        }

        let provider = match parsed {
            Ok(provider) => provider,
            Err(e) => {
                self.logger.warn(&format!("Unknown provider: {e}"));
                return String::new();
            }
        };

        let Some(summarizer) = self.summarizers.get(&provider) else {
            self.logger
                .warn(&format!("Unknown provider: no backend registered for '{provider}'"));
            return String::new();
        };

        let key = fingerprint(
            provider.as_str(),
            request.model_or(provider.default_model()),
            &request.prompt,
            &request.text,
        );

        if let Some(cached) = self.read_cache(&key).await {
            return cached;
        }

        let summary = match self.live_call(provider, summarizer.as_ref(), request).await {
            Ok(summary) => summary.trim().to_string(),
            Err(e) => {
                self.logger.warn(&format!("[{provider}] No summary generated: {e}"));
                String::new()
            }
        };

        if !summary.is_empty() {
            self.write_cache(&key, &summary).await;
        }
        summary
    }

    async fn live_call(
        &self,
        provider: Provider,
        summarizer: &dyn Summarizer,
        request: &SummaryRequest,
    ) -> Result<String, ProviderError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, summarizer.summarize(request))
                .await
                .map_err(|_| ProviderError::Timeout(provider, limit))?,
            None => summarizer.summarize(request).await,
        }
    }

    async fn read_cache(&self, key: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;
        match cache.get(key).await {
            Ok(Some(summary)) if !summary.trim().is_empty() => {
                self.logger.info(&format!("AI cache hit for hash {key}"));
                Some(summary)
            }
            Ok(_) => None,
            Err(e) => {
                self.logger.warn(&format!("Error reading AI cache: {e}"));
                None
            }
        }
    }

    async fn write_cache(&self, key: &str, summary: &str) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        match cache.put(key, summary).await {
            Ok(()) => self.logger.info(&format!("AI response cached for hash {key}")),
            Err(e) => self.logger.warn(&format!("Error writing AI cache: {e}")),
        }
    }
}
