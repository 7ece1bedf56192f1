//! Per-file pipeline: read, extract, prompt, summarize.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    batch::process_in_batches,
    config::LlmsTxtOptions,
    errors::{LlmsTxtError, Result},
    html::{PageFields, extract_page_fields},
    llms::{AiGateway, ContentShape, Provider, SummaryRequest, prompt_for},
    logging::Logger,
    text_utils::truncate_chars,
    url_utils::{full_url, rel_url},
};

/// What one page contributes to the output artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    /// Site base plus `rel_url`.
    pub url: String,
    /// `<title>`, else the first `<h1>`, else `rel_url`.
    pub title: String,
    pub summary: String,
    /// Always starts with `/`.
    pub rel_url: String,
    /// Untruncated extracted text, kept only when llms-full.txt is rendered.
    pub full_content: Option<String>,
}

/// Explicit credential if set, else the provider's environment variable via `lookup`.
///
/// Providers that need no credential, and unknown providers, resolve to the explicit
/// value or empty.
pub fn resolve_api_key(provider: &str, explicit: Option<&str>, lookup: impl Fn(&str) -> Option<String>) -> String {
    if let Some(key) = explicit.map(str::trim).filter(|key| !key.is_empty()) {
        return key.to_string();
    }
    provider
        .parse::<Provider>()
        .ok()
        .and_then(|provider| provider.api_key_env_var())
        .and_then(lookup)
        .unwrap_or_default()
}

/// Joins the non-empty fields in summary order: title, h1, h2s, h3s, paragraphs.
pub fn build_input_text(fields: &PageFields) -> String {
    [
        fields.title.clone(),
        fields.h1.clone(),
        fields.h2s.join("\n"),
        fields.h3s.join("\n"),
        fields.paragraphs.join(" "),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("\n")
}

fn content_shape(fields: &PageFields) -> ContentShape {
    ContentShape::detect(
        !fields.title.is_empty() || !fields.h1.is_empty(),
        !fields.h2s.is_empty() || !fields.h3s.is_empty(),
        !fields.paragraphs.is_empty(),
    )
}

/// Runs the page pipeline for every file of one output directory.
#[derive(Clone)]
pub struct Processor {
    output_root: PathBuf,
    options: Arc<LlmsTxtOptions>,
    api_key: String,
    gateway: Arc<AiGateway>,
    logger: Arc<dyn Logger>,
}

impl Processor {
    /// Resolves the provider credential once, falling back to the environment.
    pub fn new(
        output_root: impl Into<PathBuf>,
        options: Arc<LlmsTxtOptions>,
        gateway: Arc<AiGateway>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let api_key = resolve_api_key(
            options.provider.as_deref().unwrap_or_default(),
            options.api_key.as_deref(),
            common_ltx::env_non_empty,
        );
        Self {
            output_root: output_root.into(),
            options,
            api_key,
            gateway,
            logger,
        }
    }

    /// Processes one file. Any failure is logged and yields `None`.
    pub async fn process_file(&self, file: &Path) -> Option<PageResult> {
        match self.try_process_file(file).await {
            Ok(page) => Some(page),
            Err(e) => {
                self.logger.error(&format!("Failed to process {}: {e}", file.display()));
                None
            }
        }
    }

    async fn try_process_file(&self, file: &Path) -> Result<PageResult> {
        let bytes = tokio::fs::read(file).await.map_err(|e| LlmsTxtError::io(file, e))?;
        let html = String::from_utf8_lossy(&bytes);
        let rel = rel_url(&self.output_root, file)?;
        let url = full_url(self.options.base_url(), &rel);

        let fields = extract_page_fields(&html);
        let input = build_input_text(&fields);
        let truncated = truncate_chars(&input, self.options.max_input_length);
        let prompt = prompt_for(content_shape(&fields), self.options.language);

        let mut summary = fields.description.clone();
        if let Some(provider) = self.options.provider.as_deref().filter(|p| !p.trim().is_empty()) {
            let request = SummaryRequest {
                ai_url: self.options.ai_url.clone(),
                cli_command: self.options.cli_command.clone(),
                thinking: self.options.thinking.clone(),
                debug: self.options.debug,
                ..SummaryRequest::new(
                    provider,
                    self.api_key.as_str(),
                    self.options.model.as_deref().unwrap_or_default(),
                    prompt,
                    truncated,
                )
            };
            let generated = self.gateway.generate_summary(&request).await;
            if !generated.is_empty() {
                summary = generated;
            }
        }

        let title = [&fields.title, &fields.h1]
            .into_iter()
            .find(|t| !t.is_empty())
            .cloned()
            .unwrap_or_else(|| rel.clone());

        Ok(PageResult {
            url,
            title,
            summary: summary.trim().to_string(),
            rel_url: rel,
            full_content: self.options.llms_full.then_some(input),
        })
    }

    /// Processes every file with at most `options.concurrency` in flight.
    ///
    /// Results keep the order of `files`; failed pages and pages without a summary are dropped.
    pub async fn process_all(&self, files: Vec<PathBuf>) -> Vec<PageResult> {
        let pages = process_in_batches(
            files,
            |file, _index| {
                let processor = self.clone();
                Box::pin(async move { processor.process_file(&file).await })
            },
            self.options.concurrency,
        )
        .await;

        pages
            .into_iter()
            .filter(|page| !page.summary.trim().is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Language,
        llms::mock::{MockSummarizer, RecordingLogger, sample_empty_html, sample_page_html, sample_untitled_html},
        llms::prompts,
    };
    use std::{collections::HashMap, time::Duration};
    use tempfile::TempDir;
    use tracing::Level;

    fn write(dir: &Path, rel: &str, html: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, html).unwrap();
        path
    }

    fn processor(
        root: &Path,
        options: LlmsTxtOptions,
        mock: &MockSummarizer,
    ) -> (Processor, Arc<RecordingLogger>) {
        let logger = Arc::new(RecordingLogger::new());
        let gateway = AiGateway::empty(logger.clone()).with_summarizer(Provider::Ollama, mock.clone());
        let processor = Processor::new(root, Arc::new(options), Arc::new(gateway), logger.clone());
        (processor, logger)
    }

    #[test]
    fn test_resolve_api_key() {
        let env: HashMap<&str, &str> = [("OPENAI_API_KEY", "env-openai"), ("ANTHROPIC_API_KEY", "env-claude")].into();
        let lookup = |name: &str| env.get(name).map(|v| v.to_string());

        assert_eq!(resolve_api_key("openai", Some("explicit"), lookup), "explicit");
        assert_eq!(resolve_api_key("openai", None, lookup), "env-openai");
        assert_eq!(resolve_api_key("openai", Some("  "), lookup), "env-openai");
        assert_eq!(resolve_api_key("claude", None, lookup), "env-claude");
        assert_eq!(resolve_api_key("gemini", None, lookup), "");
        assert_eq!(resolve_api_key("ollama", None, lookup), "");
        assert_eq!(resolve_api_key("bogus", None, lookup), "");
    }

    #[test]
    fn test_build_input_text() {
        let fields = extract_page_fields(sample_page_html());
        assert_eq!(
            build_input_text(&fields),
            "Getting Started\nGetting Started\nInstall\nRequirements\nRun the installer. A recent toolchain."
        );
        assert_eq!(build_input_text(&extract_page_fields(sample_empty_html())), "");
    }

    #[test]
    fn test_content_shape() {
        assert_eq!(content_shape(&extract_page_fields(sample_page_html())), ContentShape::TitleOrHeading);
        assert_eq!(content_shape(&extract_page_fields(sample_untitled_html())), ContentShape::Subheadings);
        assert_eq!(content_shape(&extract_page_fields("<p>only text</p>")), ContentShape::Paragraphs);
        assert_eq!(content_shape(&extract_page_fields(sample_empty_html())), ContentShape::Empty);
    }

    #[tokio::test]
    async fn test_process_file_with_provider() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "docs/index.html", sample_page_html());
        let mock = MockSummarizer::with_default("  A guide to getting started.  ");
        let options = LlmsTxtOptions::builder()
            .site("https://example.com/")
            .provider("ollama")
            .model("llama3")
            .language(Language::De)
            .build();
        let (processor, _) = processor(dir.path(), options, &mock);

        let page = processor.process_file(&file).await.unwrap();

        assert_eq!(page.url, "https://example.com/docs/");
        assert_eq!(page.rel_url, "/docs/");
        assert_eq!(page.title, "Getting Started");
        assert_eq!(page.summary, "A guide to getting started.");
        assert_eq!(page.full_content, None);

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "llama3");
        assert_eq!(requests[0].prompt, prompts::main_summary_prompt(Language::De));
        assert!(requests[0].text.starts_with("Getting Started\n"));
    }

    #[tokio::test]
    async fn test_process_file_without_provider_uses_meta_description() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "about.html", sample_page_html());
        let mock = MockSummarizer::with_default("never");
        let (processor, _) = processor(dir.path(), LlmsTxtOptions::default(), &mock);

        let page = processor.process_file(&file).await.unwrap();

        assert_eq!(page.url, "/about");
        assert_eq!(page.summary, "How to install and run the project.");
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_summary_falls_back_to_meta_description() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "page.html", sample_page_html());
        let mock = MockSummarizer::with_failure();
        let options = LlmsTxtOptions::builder().provider("ollama").build();
        let (processor, logger) = processor(dir.path(), options, &mock);

        let page = processor.process_file(&file).await.unwrap();

        assert_eq!(page.summary, "How to install and run the project.");
        assert!(logger.contains(Level::WARN, "No summary generated"));
    }

    #[tokio::test]
    async fn test_title_falls_back_to_rel_url_and_input_is_truncated() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "notes/changes.html", sample_untitled_html());
        let mock = MockSummarizer::with_default("Recent changes.");
        let options = LlmsTxtOptions::builder()
            .provider("ollama")
            .max_input_length(5)
            .llms_full(true)
            .build();
        let (processor, _) = processor(dir.path(), options, &mock);

        let page = processor.process_file(&file).await.unwrap();

        assert_eq!(page.title, "/notes/changes");
        assert_eq!(mock.requests()[0].text, "Chang");
        assert_eq!(mock.requests()[0].prompt, prompts::file_list_prompt(Language::En, "Docs"));
        assert_eq!(page.full_content.as_deref(), Some("Changelog\nFixed things."));
    }

    #[tokio::test]
    async fn test_latin1_page_is_decoded_lossily() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("cafe.html");
        std::fs::write(&file, b"<title>Caf\xE9</title><meta name=\"description\" content=\"Menu\">").unwrap();
        let mock = MockSummarizer::with_default("unused");
        let (processor, logger) = processor(dir.path(), LlmsTxtOptions::default(), &mock);

        let page = processor.process_file(&file).await.unwrap();

        assert_eq!(page.summary, "Menu");
        assert_eq!(page.title, "Caf\u{FFFD}");
        assert_eq!(logger.count(Level::ERROR), 0);
    }

    #[tokio::test]
    async fn test_debug_flag_reaches_the_backend_request() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "index.html", sample_page_html());
        let mock = MockSummarizer::with_default("Summary.");
        let options = LlmsTxtOptions::builder().provider("ollama").debug(true).build();
        let (processor, _) = processor(dir.path(), options, &mock);

        processor.process_file(&file).await.unwrap();

        assert!(mock.requests()[0].debug);
    }

    #[tokio::test]
    async fn test_missing_file_is_logged_and_skipped() {
        let dir = TempDir::new().unwrap();
        let mock = MockSummarizer::with_default("x");
        let (processor, logger) = processor(dir.path(), LlmsTxtOptions::default(), &mock);

        let page = processor.process_file(&dir.path().join("missing.html")).await;

        assert!(page.is_none());
        assert!(logger.contains(Level::ERROR, "Failed to process"));
    }

    #[tokio::test]
    async fn test_process_all_filters_and_keeps_order() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write(dir.path(), "a.html", sample_page_html()),
            write(dir.path(), "b.html", sample_empty_html()),
            dir.path().join("gone.html"),
            write(dir.path(), "c.html", sample_page_html()),
        ];
        let mock = MockSummarizer::with_default("unused");
        let (processor, logger) = processor(dir.path(), LlmsTxtOptions::default(), &mock);

        let pages = processor.process_all(files).await;

        let rels: Vec<_> = pages.iter().map(|p| p.rel_url.as_str()).collect();
        assert_eq!(rels, vec!["/a", "/c"]);
        assert_eq!(logger.count(Level::ERROR), 1);
    }

    #[tokio::test]
    async fn test_process_all_respects_concurrency_limit() {
        let dir = TempDir::new().unwrap();
        let files: Vec<_> = (0..8)
            .map(|i| write(dir.path(), &format!("p{i}.html"), &format!("<title>Page {i}</title>")))
            .collect();
        let mock = MockSummarizer::with_default("summary").with_delay(Duration::from_millis(20));
        let options = LlmsTxtOptions::builder().provider("ollama").concurrency(2).build();
        let (processor, _) = processor(dir.path(), options, &mock);

        let pages = processor.process_all(files).await;

        assert_eq!(pages.len(), 8);
        assert_eq!(mock.calls(), 8);
        assert!(mock.max_in_flight() <= 2, "max in flight was {}", mock.max_in_flight());
        assert!(mock.max_in_flight() >= 1);
    }
}
