//! Site-level run: discover pages, summarize them, write the artifacts.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use globset::{Glob, GlobMatcher};
use walkdir::WalkDir;

use crate::{
    cache::{FsCache, SummaryCache},
    config::LlmsTxtOptions,
    errors::{LlmsTxtError, Result},
    formatter::format_llms_txt,
    llms::AiGateway,
    logging::Logger,
    processor::Processor,
    url_utils::validate_site,
};

pub const LLMS_TXT_FILE: &str = "llms.txt";
pub const LLMS_FULL_TXT_FILE: &str = "llms-full.txt";

const HTML_PATTERN: &str = "**/*.html";

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The artifacts were written; `pages` is the number of entries in llms.txt.
    Written {
        llms_txt: PathBuf,
        llms_full_txt: Option<PathBuf>,
        pages: usize,
    },
    /// The output directory holds no HTML pages.
    NoHtmlFiles,
    /// No page produced a summary.
    NoValidPages,
}

impl GenerationOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, GenerationOutcome::Written { .. })
    }
}

fn html_matcher() -> Result<GlobMatcher> {
    Ok(Glob::new(HTML_PATTERN)?.compile_matcher())
}

/// Every `*.html` file below `root`, sorted by path.
///
/// The walk is blocking and runs on tokio's blocking pool.
pub async fn discover_html_files(root: &Path) -> Result<Vec<PathBuf>> {
    let matcher = html_matcher()?;
    let walk_root = root.to_path_buf();
    tokio::task::spawn_blocking(move || walk_html_files(&walk_root, &matcher))
        .await
        .map_err(|e| LlmsTxtError::io(root, std::io::Error::other(e)))?
}

fn walk_html_files(root: &Path, matcher: &GlobMatcher) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if entry.file_type().is_dir() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root)
            && matcher.is_match(relative)
        {
            found.push(entry.into_path());
        }
    }

    found.sort();
    Ok(found)
}

fn walk_error(root: &Path, error: walkdir::Error) -> LlmsTxtError {
    let path = error.path().unwrap_or(root).to_path_buf();
    LlmsTxtError::io(path, error.into())
}

async fn write_artifact(path: PathBuf, contents: &str) -> Result<PathBuf> {
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| LlmsTxtError::io(&path, e))?;
    Ok(path)
}

/// Runs the whole pipeline against `root` with a caller-supplied gateway.
pub async fn generate(
    root: &Path,
    options: LlmsTxtOptions,
    gateway: Arc<AiGateway>,
    logger: Arc<dyn Logger>,
) -> Result<GenerationOutcome> {
    validate_site(&options.site)?;

    let files = discover_html_files(root).await?;
    if files.is_empty() {
        logger.warn(&format!("No HTML files found in {}", root.display()));
        return Ok(GenerationOutcome::NoHtmlFiles);
    }
    logger.info(&format!("Found {} HTML files in {}", files.len(), root.display()));

    let options = Arc::new(options);
    let processor = Processor::new(root, options.clone(), gateway, logger.clone());
    let pages = processor.process_all(files).await;
    if pages.is_empty() {
        logger.warn("No AI responses or summaries received, llms.txt not written.");
        return Ok(GenerationOutcome::NoValidPages);
    }

    let output = format_llms_txt(&pages, &options);
    let llms_txt = write_artifact(root.join(LLMS_TXT_FILE), &output.short).await?;
    logger.info(&format!("llms.txt written to {}", llms_txt.display()));

    let llms_full_txt = match output.full {
        Some(full) => {
            let path = write_artifact(root.join(LLMS_FULL_TXT_FILE), &full).await?;
            logger.info(&format!("llms-full.txt written to {}", path.display()));
            Some(path)
        }
        None => None,
    };

    Ok(GenerationOutcome::Written {
        llms_txt,
        llms_full_txt,
        pages: pages.len(),
    })
}

/// Runs with the built-in backends, the on-disk cache (unless disabled) and the configured timeout.
pub async fn run(root: &Path, options: LlmsTxtOptions, logger: Arc<dyn Logger>) -> Result<GenerationOutcome> {
    let mut gateway = AiGateway::new(logger.clone()).with_timeout(options.request_timeout);

    if options.cache {
        match FsCache::in_output_root(root).await {
            Ok(cache) => {
                logger.debug(&format!("Using AI cache at {}", cache.dir().display()));
                let cache: Arc<dyn SummaryCache> = Arc::new(cache);
                gateway = gateway.with_cache(cache);
            }
            Err(e) => logger.warn(&format!("Continuing without AI cache: {e}")),
        }
    }

    generate(root, options, Arc::new(gateway), logger).await
}
