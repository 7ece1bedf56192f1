//! Post-build llms.txt generation for rendered static sites.
//!
//! [`generator::run`] walks an output directory for `*.html`, extracts each page's
//! text, asks the configured AI provider for a summary (through a content-addressed
//! cache) and writes `llms.txt`, plus `llms-full.txt` when requested.

pub mod batch;
pub mod cache;
pub mod config;
pub mod errors;
pub mod formatter;
pub mod generator;
pub mod html;
pub mod llms;
pub mod logging;
pub mod processor;
pub mod text_utils;
pub mod url_utils;

pub use config::{Language, LlmsTxtOptions, LlmsTxtOptionsBuilder, ThinkingConfig};
pub use errors::{LlmsTxtError, Result};
pub use formatter::{LlmsTxtOutput, format_llms_txt};
pub use generator::{GenerationOutcome, discover_html_files, generate, run};
pub use llms::{AiGateway, Provider, ProviderError, Summarizer, SummaryRequest};
pub use logging::{Logger, NoopLogger, TracingLogger, setup_logging};
pub use processor::{PageResult, Processor};
