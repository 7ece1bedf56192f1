//! Instruction prompts sent to the summarizer, following the llms.txt standard at https://llmstxt.org/

use indoc::indoc;

use crate::config::Language;

/// What a page offers to summarize, from richest to poorest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentShape {
    /// The page has a `<title>` or an `<h1>`.
    TitleOrHeading,
    /// No title, but `<h2>`/`<h3>` sub-headings.
    Subheadings,
    /// Only paragraph text.
    Paragraphs,
    /// Nothing recognizable.
    Empty,
}

impl ContentShape {
    /// Classifies a page by which kinds of text it has, richest first.
    pub fn detect(has_title_or_h1: bool, has_subheadings: bool, has_paragraphs: bool) -> Self {
        if has_title_or_h1 {
            ContentShape::TitleOrHeading
        } else if has_subheadings {
            ContentShape::Subheadings
        } else if has_paragraphs {
            ContentShape::Paragraphs
        } else {
            ContentShape::Empty
        }
    }
}

const MAIN_SUMMARY: &str = indoc! { "
  Act as an expert technical writer. Create a high-quality Markdown H1 and a blockquote for an 'llms.txt' file.
  The H1 should be the project name. The blockquote must be a concise (max 3 sentences) but information-dense summary
  of the project's purpose, target audience, and key features. Target LLMs specifically, so they can quickly grasp the context.
  Avoid marketing fluff."
};

const DETAILS: &str = indoc! { "
  Provide a detailed but concise Markdown section (no heading) for an 'llms.txt' file.
  Describe the key technical components, architecture, or usage patterns that an LLM should know to help a developer.
  Focus on what's unique or critical for understanding the codebase or site structure."
};

const FULL_LLMS_TXT: &str = indoc! { "
  Generate a complete 'llms.txt' following the standard. Include an H1 title, a blockquote summary,
  a details section, and categorized lists of links (H2 sections).
  Prioritize clarity, technical depth, and density of information for Large Language Models."
};

/// Section name used by the file-list prompt when none is given.
pub const DEFAULT_FILE_LIST_SECTION: &str = "Docs";

fn localize(base: &str, language: Language) -> String {
    match language {
        Language::De => format!("{base} Antworte auf Deutsch."),
        Language::Fr => format!("{base} Répondez en français."),
        Language::En => base.to_string(),
    }
}

pub fn main_summary_prompt(language: Language) -> String {
    localize(MAIN_SUMMARY, language)
}

pub fn details_prompt(language: Language) -> String {
    localize(DETAILS, language)
}

pub fn file_list_prompt(language: Language, section: &str) -> String {
    let base = format!(
        "Create a Markdown H2 named '{section}' followed by a list of links.\n\
         For each link provided, write a very brief, one-sentence description explaining its technical relevance or content.\n\
         The goal is to help an LLM decide which pages are most relevant for a specific query."
    );
    localize(&base, language)
}

pub fn full_llms_txt_prompt(language: Language) -> String {
    localize(FULL_LLMS_TXT, language)
}

/// Picks the instruction for a page of the given shape.
pub fn prompt_for(shape: ContentShape, language: Language) -> String {
    match shape {
        ContentShape::TitleOrHeading => main_summary_prompt(language),
        ContentShape::Subheadings => file_list_prompt(language, DEFAULT_FILE_LIST_SECTION),
        ContentShape::Paragraphs => details_prompt(language),
        ContentShape::Empty => full_llms_txt_prompt(language),
    }
}
