//! HTML parsing utilities for extracting page text.
//!
//! Every function degrades gracefully: malformed markup, an invalid selector or a
//! missing tag all yield empty results instead of errors.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// `/segment/` at the start of a path.
static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/([^/]+)/").expect("valid section regex"));

/// Structured text pulled out of one rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    pub url: String,
    pub title: String,
    pub description: String,
    /// All `h1`s, then all `h2`s, then all `h3`s.
    pub headings: Vec<String>,
    pub paragraphs: Vec<String>,
    /// First path segment of `url`, or empty.
    pub section: String,
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn select_first(document: &Html, selector: &str) -> String {
    match Selector::parse(selector) {
        Ok(selector) => document.select(&selector).next().map(element_text).unwrap_or_default(),
        Err(_) => String::new(),
    }
}

fn select_all(document: &Html, selector: &str) -> Vec<String> {
    match Selector::parse(selector) {
        Ok(selector) => document
            .select(&selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn select_meta(document: &Html, name: &str) -> String {
    let Ok(selector) = Selector::parse(&format!(r#"meta[name="{name}"]"#)) else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_default()
}

/// Extracts the trimmed text of the first element matching `tag`.
///
/// # Examples
///
/// ```
/// # use core_ltx::html::extract_field;
/// let html = r#"<html><head><title> Example Title </title></head></html>"#;
/// assert_eq!(extract_field(html, "title"), "Example Title");
/// assert_eq!(extract_field(html, "h1"), "");
/// ```
pub fn extract_field(html: &str, tag: &str) -> String {
    select_first(&Html::parse_document(html), tag)
}

/// Extracts the trimmed text of every element matching `tag`, in document order,
/// skipping elements without text.
pub fn extract_all_fields(html: &str, tag: &str) -> Vec<String> {
    select_all(&Html::parse_document(html), tag)
}

/// Extracts the trimmed `content` attribute of `<meta name="{name}">`.
///
/// # Examples
///
/// ```
/// # use core_ltx::html::extract_meta;
/// let html = r#"<html><head><meta name="description" content="Example description"></head></html>"#;
/// assert_eq!(extract_meta(html, "description"), "Example description");
/// assert_eq!(extract_meta(html, "keywords"), "");
/// ```
pub fn extract_meta(html: &str, name: &str) -> String {
    select_meta(&Html::parse_document(html), name)
}

/// Parses the section from a site-relative path: the first segment when it is
/// followed by another `/`, otherwise empty.
pub fn section_of(path: &str) -> String {
    SECTION_RE
        .captures(path)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Extracts title, description, headings, paragraphs and section in one parse.
pub fn extract_structured(html: &str, url: &str) -> ExtractedContent {
    let document = Html::parse_document(html);

    let headings = ["h1", "h2", "h3"]
        .iter()
        .flat_map(|tag| select_all(&document, tag))
        .collect();

    ExtractedContent {
        url: url.to_string(),
        title: select_first(&document, "title"),
        description: select_meta(&document, "description"),
        headings,
        paragraphs: select_all(&document, "p"),
        section: section_of(url),
    }
}

/// The per-level fields a page summary is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFields {
    pub title: String,
    pub description: String,
    /// First `h1` only.
    pub h1: String,
    pub h2s: Vec<String>,
    pub h3s: Vec<String>,
    pub paragraphs: Vec<String>,
}

/// Like [`extract_structured`], but keeps the heading levels apart.
pub fn extract_page_fields(html: &str) -> PageFields {
    let document = Html::parse_document(html);
    PageFields {
        title: select_first(&document, "title"),
        description: select_meta(&document, "description"),
        h1: select_first(&document, "h1"),
        h2s: select_all(&document, "h2"),
        h3s: select_all(&document, "h3"),
        paragraphs: select_all(&document, "p"),
    }
}
