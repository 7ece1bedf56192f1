//! Error types for llms.txt generation.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the page pipeline and the site-level run.
#[derive(Debug, Error)]
pub enum LlmsTxtError {
    /// Reading an HTML file, walking the output directory, or writing an artifact failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A discovered file does not live under the output root.
    #[error("{file} is not inside the output directory {root}")]
    OutsideOutputRoot { file: PathBuf, root: PathBuf },

    /// The configured site base is not a valid absolute URL.
    #[error("Invalid site URL '{site}': {source}")]
    InvalidSite {
        site: String,
        #[source]
        source: url::ParseError,
    },

    /// Glob pattern error
    #[error("Glob pattern error: {0}")]
    GlobError(#[from] globset::Error),
}

impl LlmsTxtError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Type alias for Result with LlmsTxtError
pub type Result<T> = std::result::Result<T, LlmsTxtError>;
