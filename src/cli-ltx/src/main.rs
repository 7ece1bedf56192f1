use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use core_ltx::{
    GenerationOutcome, Language, LlmsTxtOptions, ThinkingConfig, TracingLogger,
    config::{DEFAULT_CONCURRENCY, DEFAULT_DESCRIPTION, DEFAULT_MAX_INPUT_LENGTH, DEFAULT_PROJECT_NAME},
    setup_logging,
};

#[derive(Parser, Debug)]
#[command(name = "llms-txt")]
#[command(about = "Summarizes a rendered static site into llms.txt", long_about = None)]
struct Cli {
    /// Build output directory holding the rendered HTML pages
    #[arg(value_parser = validate_output_dir, env = "LLMS_TXT_DIR")]
    dir: PathBuf,

    /// Project name used as the H1 of the generated files
    #[arg(long, env = "LLMS_TXT_PROJECT_NAME", default_value = DEFAULT_PROJECT_NAME)]
    project_name: String,

    /// Project description used as the blockquote of llms.txt
    #[arg(long, env = "LLMS_TXT_DESCRIPTION", default_value = DEFAULT_DESCRIPTION)]
    description: String,

    /// Site base URL prefixed to every page path
    #[arg(long, env = "LLMS_TXT_SITE", value_parser = validate_url, default_value = "")]
    site: String,

    /// Maximum number of characters per page sent to the provider
    #[arg(long, env = "LLMS_TXT_MAX_INPUT_LENGTH", default_value_t = DEFAULT_MAX_INPUT_LENGTH)]
    max_input_length: usize,

    /// Prompt language: en, de or fr
    #[arg(long, env = "LLMS_TXT_LANGUAGE", default_value = "en")]
    language: String,

    /// AI provider: openai, gemini, claude, ollama or cli
    #[arg(long, env = "LLMS_TXT_PROVIDER")]
    provider: Option<String>,

    /// Provider credential; defaults to the provider's own environment variable
    #[arg(long, env = "LLMS_TXT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model identifier
    #[arg(long, env = "LLMS_TXT_MODEL")]
    model: Option<String>,

    /// Provider endpoint override
    #[arg(long, env = "LLMS_TXT_AI_URL")]
    ai_url: Option<String>,

    /// Pages processed at the same time
    #[arg(long, env = "LLMS_TXT_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Also write llms-full.txt
    #[arg(long, env = "LLMS_TXT_FULL")]
    full: bool,

    /// Command for the cli provider; `{model}` is replaced with the model
    #[arg(long, env = "LLMS_TXT_CLI_COMMAND")]
    cli_command: Option<String>,

    /// Gemini thinking level
    #[arg(long, env = "LLMS_TXT_THINKING_LEVEL")]
    thinking_level: Option<String>,

    /// Gemini thinking budget in tokens (-1 lets the model decide)
    #[arg(long, env = "LLMS_TXT_THINKING_BUDGET", allow_hyphen_values = true)]
    thinking_budget: Option<i64>,

    /// Verbose logging
    #[arg(long, env = "LLMS_TXT_DEBUG")]
    debug: bool,

    /// Skip the on-disk summary cache
    #[arg(long, env = "LLMS_TXT_NO_CACHE")]
    no_cache: bool,

    /// Upper bound in seconds for one provider call
    #[arg(long, env = "LLMS_TXT_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

impl Cli {
    fn options(&self) -> LlmsTxtOptions {
        let mut builder = LlmsTxtOptions::builder()
            .project_name(&self.project_name)
            .description(&self.description)
            .site(&self.site)
            .max_input_length(self.max_input_length)
            .language(Language::from_code(&self.language))
            .concurrency(self.concurrency)
            .llms_full(self.full)
            .thinking(ThinkingConfig {
                level: self.thinking_level.clone(),
                budget: self.thinking_budget,
            })
            .debug(self.debug)
            .cache(!self.no_cache);

        if let Some(provider) = &self.provider {
            builder = builder.provider(provider);
        }
        if let Some(api_key) = &self.api_key {
            builder = builder.api_key(api_key);
        }
        if let Some(model) = &self.model {
            builder = builder.model(model);
        }
        if let Some(ai_url) = &self.ai_url {
            builder = builder.ai_url(ai_url);
        }
        if let Some(cli_command) = &self.cli_command {
            builder = builder.cli_command(cli_command);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        builder.build()
    }
}

fn validate_url(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Ok(String::new());
    }
    core_ltx::url_utils::validate_site(s)
        .map(|_| s.to_string())
        .map_err(|e| e.to_string())
}

fn validate_output_dir(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    if !path.exists() {
        return Err(format!("Output directory does not exist: {}", path.display()));
    }

    if !path.is_dir() {
        return Err(format!("Output path is not a directory: {}", path.display()));
    }

    Ok(path)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file., if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    setup_logging(if cli.debug {
        "cli_ltx=debug,core_ltx=debug"
    } else {
        "cli_ltx=info,core_ltx=info"
    });

    let options = cli.options();
    match core_ltx::run(&cli.dir, options, Arc::new(TracingLogger)).await {
        Ok(GenerationOutcome::Written { pages, .. }) => {
            tracing::info!("Generated llms.txt with {pages} pages");
        }
        Ok(GenerationOutcome::NoHtmlFiles) => {
            tracing::error!("Build aborted: No HTML files found.");
            std::process::exit(1)
        }
        Ok(GenerationOutcome::NoValidPages) => {
            tracing::error!("Build aborted: No AI responses/summaries received.");
            std::process::exit(1)
        }
        Err(e) => {
            tracing::error!("llms.txt generation failed: {e}");
            std::process::exit(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_options_from_args() {
        let dir = std::env::temp_dir();
        let cli = Cli::try_parse_from([
            "llms-txt",
            dir.to_str().unwrap(),
            "--project-name",
            "Acme",
            "--site",
            "https://acme.dev/",
            "--language",
            "fr",
            "--provider",
            "gemini",
            "--concurrency",
            "2",
            "--full",
            "--thinking-budget",
            "-1",
            "--no-cache",
            "--timeout-secs",
            "30",
        ])
        .unwrap();

        let options = cli.options();
        assert_eq!(options.project_name, "Acme");
        assert_eq!(options.base_url(), "https://acme.dev");
        assert_eq!(options.language, Language::Fr);
        assert_eq!(options.provider.as_deref(), Some("gemini"));
        assert_eq!(options.concurrency, 2);
        assert!(options.llms_full);
        assert_eq!(options.thinking.budget, Some(-1));
        assert!(!options.cache);
        assert_eq!(options.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_rejects_missing_dir() {
        let result = Cli::try_parse_from(["llms-txt", "/definitely/not/here/llms"]);
        assert!(result.is_err());
    }
}
