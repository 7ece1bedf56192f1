//! Summarization backends and the gateway that fronts them.

pub mod chatgpt;
pub mod claude;
pub mod cli;
pub mod gateway;
pub mod gemini;
pub mod mock;
pub mod ollama;
pub mod prompts;
pub mod retry;

use std::{fmt, str::FromStr, time::Duration};

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ThinkingConfig;

pub use chatgpt::ChatGpt;
pub use claude::Claude;
pub use cli::CliCommand;
pub use gateway::AiGateway;
pub use gemini::Gemini;
pub use ollama::Ollama;
pub use prompts::{ContentShape, prompt_for};
pub use retry::{RetryPolicy, Retrying};

/// The supported summarization backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Gemini,
    Claude,
    Ollama,
    Cli,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::OpenAi,
        Provider::Gemini,
        Provider::Claude,
        Provider::Ollama,
        Provider::Cli,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
            Provider::Claude => "claude",
            Provider::Ollama => "ollama",
            Provider::Cli => "cli",
        }
    }

    /// Local providers run without a credential.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Provider::Ollama | Provider::Cli)
    }

    /// Environment variable consulted when no explicit credential is configured.
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Provider::OpenAi => Some("OPENAI_API_KEY"),
            Provider::Gemini => Some("GEMINI_API_KEY"),
            Provider::Claude => Some("ANTHROPIC_API_KEY"),
            Provider::Ollama | Provider::Cli => None,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o",
            Provider::Gemini => "gemini-2.5-flash-lite",
            Provider::Claude => "claude-3-5-haiku-latest",
            Provider::Ollama => "llama3",
            Provider::Cli => "",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown AI provider '{0}'")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "gemini" => Ok(Provider::Gemini),
            "claude" | "anthropic" => Ok(Provider::Claude),
            "ollama" => Ok(Provider::Ollama),
            "cli" => Ok(Provider::Cli),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// Everything a backend needs for one summary. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct SummaryRequest {
    /// Provider identifier as configured (may be empty or unknown).
    pub provider: String,
    pub api_key: String,
    /// Empty means the provider's default model.
    pub model: String,
    pub prompt: String,
    pub text: String,
    /// Endpoint override.
    pub ai_url: Option<String>,
    /// Command line for the `cli` provider.
    pub cli_command: Option<String>,
    pub thinking: ThinkingConfig,
    /// Backends log the raw exchange when set.
    pub debug: bool,
}

impl SummaryRequest {
    pub fn new(
        provider: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        prompt: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            api_key: api_key.into(),
            model: model.into(),
            prompt: prompt.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// The configured model, or the provider's default when none was given.
    pub fn model_or<'a>(&'a self, default: &'a str) -> &'a str {
        if self.model.trim().is_empty() { default } else { self.model.trim() }
    }
}

/// Why a single backend call produced no summary.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("OpenAI API error: {0}")]
    OpenAi(#[from] async_openai::error::OpenAIError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: Provider,
        status: u16,
        body: String,
    },

    #[error("{0} returned no usable text")]
    EmptyResponse(Provider),

    #[error("no command configured for the cli provider")]
    MissingCommand,

    #[error("command failed to run: {0}")]
    CommandIo(#[from] std::io::Error),

    #[error("command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("{0} call timed out after {1:?}")]
    Timeout(Provider, Duration),
}

/// One backend able to turn `(prompt, text)` into a summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Returns the trimmed summary. An empty string is a valid, if useless, answer.
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, ProviderError>;
}

/// Joins prompt and input text into a single user message.
pub(crate) fn combined_message(request: &SummaryRequest) -> String {
    format!("{}\n{}", request.prompt, request.text)
}

/// Reads an error response body for logging.
pub(crate) async fn status_error(provider: Provider, response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProviderError::Status { provider, status, body }
}
