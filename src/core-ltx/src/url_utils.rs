//! Mapping rendered files to the URLs they are served at.

use std::{path::Path, sync::LazyLock};

use regex::Regex;
use url::Url;

use crate::errors::{LlmsTxtError, Result};

static REPEATED_SLASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/{2,}").expect("valid slash regex"));

/// Turns a path relative to the output root into a site-relative URL path.
///
/// Separators become `/`, the result always starts with `/`, a trailing `.html` is
/// dropped, an `index` leaf collapses to its directory and runs of `/` collapse to one.
///
/// # Examples
///
/// ```
/// # use core_ltx::url_utils::normalize_rel_path;
/// assert_eq!(normalize_rel_path("blog/index.html"), "/blog/");
/// assert_eq!(normalize_rel_path("about.html"), "/about");
/// assert_eq!(normalize_rel_path(r"docs\guide.html"), "/docs/guide");
/// ```
pub fn normalize_rel_path(relative: &str) -> String {
    let mut rel = relative.replace('\\', "/");
    if !rel.starts_with('/') {
        rel.insert(0, '/');
    }
    if let Some(stripped) = rel.strip_suffix(".html") {
        rel = stripped.to_string();
    }
    if let Some(stripped) = rel.strip_suffix("/index") {
        rel = format!("{stripped}/");
    }
    REPEATED_SLASHES.replace_all(&rel, "/").into_owned()
}

/// Site-relative URL path of `file` under `output_root`.
pub fn rel_url(output_root: &Path, file: &Path) -> Result<String> {
    let relative = file
        .strip_prefix(output_root)
        .map_err(|_| LlmsTxtError::OutsideOutputRoot {
            file: file.to_path_buf(),
            root: output_root.to_path_buf(),
        })?;
    Ok(normalize_rel_path(&relative.to_string_lossy()))
}

/// Prefixes a site-relative path with the site base (which may be empty).
pub fn full_url(base_url: &str, rel_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), rel_url)
}

/// Checks that a non-empty site base is an absolute URL.
pub fn validate_site(site: &str) -> Result<()> {
    if site.trim().is_empty() {
        return Ok(());
    }
    Url::parse(site).map(|_| ()).map_err(|source| LlmsTxtError::InvalidSite {
        site: site.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_normalize_rel_path() {
        assert_eq!(normalize_rel_path("index.html"), "/");
        assert_eq!(normalize_rel_path("blog/index.html"), "/blog/");
        assert_eq!(normalize_rel_path("blog/post.html"), "/blog/post");
        assert_eq!(normalize_rel_path("about.html"), "/about");
        assert_eq!(normalize_rel_path("a//b///c.html"), "/a/b/c");
        assert_eq!(normalize_rel_path(r"docs\api\index.html"), "/docs/api/");
        assert_eq!(normalize_rel_path("notindex.html"), "/notindex");
    }

    #[test]
    fn test_rel_url_and_full_url() {
        let root = PathBuf::from("/site/dist");
        let rel = rel_url(&root, &root.join("blog").join("index.html")).unwrap();
        assert_eq!(rel, "/blog/");
        assert_eq!(full_url("https://example.com", &rel), "https://example.com/blog/");

        let rel = rel_url(&root, &root.join("about.html")).unwrap();
        assert_eq!(full_url("https://example.com/", &rel), "https://example.com/about");
        assert_eq!(full_url("", &rel), "/about");
    }

    #[test]
    fn test_rel_url_outside_root() {
        let result = rel_url(Path::new("/site/dist"), Path::new("/elsewhere/page.html"));
        assert!(matches!(result, Err(LlmsTxtError::OutsideOutputRoot { .. })));
    }

    #[test]
    fn test_validate_site() {
        assert!(validate_site("").is_ok());
        assert!(validate_site("https://example.com").is_ok());
        assert!(validate_site("not a url").is_err());
    }
}
