//! Renders processed pages into llms.txt and llms-full.txt.

use std::collections::BTreeMap;

use crate::{config::LlmsTxtOptions, html::section_of, processor::PageResult, text_utils::capitalize_first};

/// Bucket for pages that sit directly under the site root.
pub const DEFAULT_SECTION: &str = "General";

/// The rendered artifacts. `full` is set only when llms-full.txt was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmsTxtOutput {
    pub short: String,
    pub full: Option<String>,
}

/// Groups pages by the first segment of their `rel_url`, sections sorted by key,
/// pages in their given order within a section.
pub fn group_by_section(pages: &[PageResult]) -> BTreeMap<String, Vec<&PageResult>> {
    let mut sections: BTreeMap<String, Vec<&PageResult>> = BTreeMap::new();
    for page in pages {
        let section = section_of(&page.rel_url);
        let key = if section.is_empty() { DEFAULT_SECTION.to_string() } else { section };
        sections.entry(key).or_default().push(page);
    }
    sections
}

/// Builds the llms.txt body and, if `options.llms_full`, the llms-full.txt body.
pub fn format_llms_txt(pages: &[PageResult], options: &LlmsTxtOptions) -> LlmsTxtOutput {
    let mut short = String::new();
    short.push_str(&format!("# {}\n\n", options.project_name));
    short.push_str(&format!("> {}\n\n", options.description));
    for (section, entries) in group_by_section(pages) {
        short.push_str(&format!("## {}\n\n", capitalize_first(&section)));
        for page in entries {
            short.push_str(&format!("- [{}]({}): {}\n", page.title, page.url, page.summary));
        }
        short.push('\n');
    }

    let full = options.llms_full.then(|| {
        let mut full = format!("# {} - Full Content\n\n", options.project_name);
        for page in pages {
            if let Some(content) = page.full_content.as_deref() {
                full.push_str(&format!("## {}\n\nURL: {}\n\n{}\n\n---\n\n", page.title, page.url, content));
            }
        }
        full
    });

    LlmsTxtOutput { short, full }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(rel_url: &str, title: &str, summary: &str) -> PageResult {
        PageResult {
            url: format!("https://example.com{rel_url}"),
            title: title.to_string(),
            summary: summary.to_string(),
            rel_url: rel_url.to_string(),
            full_content: Some(format!("{title} body")),
        }
    }

    fn options(llms_full: bool) -> LlmsTxtOptions {
        LlmsTxtOptions::builder()
            .project_name("Acme")
            .description("Tools for everything.")
            .llms_full(llms_full)
            .build()
    }

    #[test]
    fn test_sections_are_sorted() {
        let pages = vec![
            page("/docs/guide", "Guide", "How to use it."),
            page("/blog/post1", "Post 1", "First post."),
        ];

        let output = format_llms_txt(&pages, &options(false));

        assert_eq!(
            output.short,
            "# Acme\n\n> Tools for everything.\n\n\
             ## Blog\n\n- [Post 1](https://example.com/blog/post1): First post.\n\n\
             ## Docs\n\n- [Guide](https://example.com/docs/guide): How to use it.\n\n"
        );
        assert_eq!(output.full, None);
    }

    #[test]
    fn test_root_pages_go_to_default_section() {
        let pages = vec![page("/about", "About", "Who we are."), page("/", "Home", "Start here.")];

        let sections = group_by_section(&pages);

        assert_eq!(sections.keys().collect::<Vec<_>>(), vec!["General"]);
        let titles: Vec<_> = sections["General"].iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["About", "Home"]);
    }

    #[test]
    fn test_section_index_page() {
        let pages = vec![page("/blog/", "Blog", "All posts.")];
        let output = format_llms_txt(&pages, &options(false));
        assert!(output.short.contains("## Blog\n\n- [Blog](https://example.com/blog/): All posts.\n"));
    }

    #[test]
    fn test_full_output_follows_page_order() {
        let mut skipped = page("/docs/empty", "Empty", "Nothing.");
        skipped.full_content = None;
        let pages = vec![
            page("/docs/guide", "Guide", "How to use it."),
            skipped,
            page("/blog/post1", "Post 1", "First post."),
        ];

        let output = format_llms_txt(&pages, &options(true));

        assert_eq!(
            output.full.as_deref(),
            Some(
                "# Acme - Full Content\n\n\
                 ## Guide\n\nURL: https://example.com/docs/guide\n\nGuide body\n\n---\n\n\
                 ## Post 1\n\nURL: https://example.com/blog/post1\n\nPost 1 body\n\n---\n\n"
            )
        );
    }

    #[test]
    fn test_no_pages() {
        let output = format_llms_txt(&[], &options(true));
        assert_eq!(output.short, "# Acme\n\n> Tools for everything.\n\n");
        assert_eq!(output.full.as_deref(), Some("# Acme - Full Content\n\n"));
    }
}
