//! Configuration options for llms.txt generation.

use std::time::Duration;

/// Output language for the summarization prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    De,
    Fr,
}

impl Language {
    /// Maps a language code (`en`, `de`, `fr`, case-insensitive) to a language.
    /// Anything unrecognized falls back to English.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "de" => Language::De,
            "fr" => Language::Fr,
            _ => Language::En,
        }
    }
}

/// Reasoning ("thinking") tuning forwarded to the Gemini backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThinkingConfig {
    /// Named effort level, e.g. `low` or `high`.
    pub level: Option<String>,
    /// Token budget for reasoning. `-1` lets the model decide, `0` disables thinking.
    pub budget: Option<i64>,
}

impl ThinkingConfig {
    pub fn is_empty(&self) -> bool {
        self.level.is_none() && self.budget.is_none()
    }
}

pub const DEFAULT_PROJECT_NAME: &str = "Projectname";
pub const DEFAULT_DESCRIPTION: &str = "Automatically generated overview for LLMs.";
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 8000;
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Configuration options for a generation run.
#[derive(Debug, Clone)]
pub struct LlmsTxtOptions {
    /// Display name, rendered as the H1 of both artifacts
    pub project_name: String,
    /// Display description, rendered as the blockquote of llms.txt
    pub description: String,
    /// Site base URL prefixed to every page path (may be empty for relative links)
    pub site: String,
    /// Maximum number of characters of extracted text sent to the provider per page
    pub max_input_length: usize,
    /// Prompt language
    pub language: Language,
    /// Provider identifier (`openai`, `gemini`, `claude`, `ollama`, `cli`). `None` disables summarization.
    pub provider: Option<String>,
    /// Explicit provider credential; falls back to the provider's environment variable
    pub api_key: Option<String>,
    /// Model identifier; each provider has its own default
    pub model: Option<String>,
    /// Endpoint override for the provider
    pub ai_url: Option<String>,
    /// Maximum number of pages processed simultaneously (default: 5)
    pub concurrency: usize,
    /// Also render llms-full.txt
    pub llms_full: bool,
    /// Shell command used by the `cli` provider
    pub cli_command: Option<String>,
    /// Gemini reasoning tuning
    pub thinking: ThinkingConfig,
    /// Verbose provider logging
    pub debug: bool,
    /// Persist summaries under `<root>/.llms-txt-cache`
    pub cache: bool,
    /// Upper bound for a single live provider call
    pub request_timeout: Option<Duration>,
}

impl Default for LlmsTxtOptions {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            site: String::new(),
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
            language: Language::En,
            provider: None,
            api_key: None,
            model: None,
            ai_url: None,
            concurrency: DEFAULT_CONCURRENCY,
            llms_full: false,
            cli_command: None,
            thinking: ThinkingConfig::default(),
            debug: false,
            cache: true,
            request_timeout: None,
        }
    }
}

impl LlmsTxtOptions {
    /// Creates a new builder for LlmsTxtOptions.
    pub fn builder() -> LlmsTxtOptionsBuilder {
        LlmsTxtOptionsBuilder {
            options: LlmsTxtOptions::default(),
        }
    }

    /// The site base without its trailing slash.
    pub fn base_url(&self) -> &str {
        self.site.trim_end_matches('/')
    }
}

/// Builder for LlmsTxtOptions.
#[derive(Debug, Clone)]
pub struct LlmsTxtOptionsBuilder {
    options: LlmsTxtOptions,
}

impl LlmsTxtOptionsBuilder {
    pub fn project_name(mut self, project_name: impl Into<String>) -> Self {
        self.options.project_name = project_name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.options.description = description.into();
        self
    }

    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.options.site = site.into();
        self
    }

    /// Sets the maximum input length. Zero is ignored.
    pub fn max_input_length(mut self, max_input_length: usize) -> Self {
        if max_input_length > 0 {
            self.options.max_input_length = max_input_length;
        }
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.options.language = language;
        self
    }

    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.options.provider = Some(provider.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.options.api_key = Some(api_key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.options.model = Some(model.into());
        self
    }

    pub fn ai_url(mut self, ai_url: impl Into<String>) -> Self {
        self.options.ai_url = Some(ai_url.into());
        self
    }

    /// Sets the concurrency level (number of pages in flight). Zero is ignored.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        if concurrency > 0 {
            self.options.concurrency = concurrency;
        }
        self
    }

    pub fn llms_full(mut self, llms_full: bool) -> Self {
        self.options.llms_full = llms_full;
        self
    }

    pub fn cli_command(mut self, cli_command: impl Into<String>) -> Self {
        self.options.cli_command = Some(cli_command.into());
        self
    }

    pub fn thinking(mut self, thinking: ThinkingConfig) -> Self {
        self.options.thinking = thinking;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.options.debug = debug;
        self
    }

    pub fn cache(mut self, cache: bool) -> Self {
        self.options.cache = cache;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.options.request_timeout = Some(timeout);
        self
    }

    /// Builds the LlmsTxtOptions.
    pub fn build(self) -> LlmsTxtOptions {
        self.options
    }
}
