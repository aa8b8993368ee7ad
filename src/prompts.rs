//! Prompt templates and the call sites that use them.
//!
//! Every model call in the pipeline goes through one of the [`CallSite`]s
//! below, so sampling parameters and failure handling are declared next to
//! the prompt they belong to.

use crate::llm::{CallSite, FailurePolicy, GenerationParams};

/// Upper bound on document text sent to full-document calls
/// (language detection, summary, concepts).
pub const MAX_DOCUMENT_CHARS: usize = 12_000;
/// Content prefix fed into the query prompt.
pub const QUERY_CONTENT_CHARS: usize = 500;
/// Per-page prefix fed into the PDF section prompt.
pub const PDF_PAGE_CHARS: usize = 1_000;

pub const PAGE_PLACEHOLDER: &str = "Error summarizing this section.";

const FULL_DOCUMENT_PARAMS: GenerationParams = GenerationParams::new(0.0, 256);

pub const DETECT_LANGUAGE: CallSite = CallSite {
    name: "detect_language",
    params: FULL_DOCUMENT_PARAMS,
    on_failure: FailurePolicy::Abort,
};

pub const SUMMARIZE: CallSite = CallSite {
    name: "summarize",
    params: FULL_DOCUMENT_PARAMS,
    on_failure: FailurePolicy::Abort,
};

pub const EXTRACT_CONCEPTS: CallSite = CallSite {
    name: "extract_concepts",
    params: FULL_DOCUMENT_PARAMS,
    on_failure: FailurePolicy::Abort,
};

pub const GENERATE_QUERY: CallSite = CallSite {
    name: "generate_query",
    params: GenerationParams::new(0.5, 50),
    on_failure: FailurePolicy::Abort,
};

/// A failed page degrades to [`PAGE_PLACEHOLDER`] instead of failing the document.
pub const SUMMARIZE_PDF_PAGE: CallSite = CallSite {
    name: "summarize_pdf_page",
    params: GenerationParams::new(0.5, 200),
    on_failure: FailurePolicy::Substitute(PAGE_PLACEHOLDER),
};

pub fn detect_language(content: &str) -> String {
    format!(
        "Determine the language of the following text. \
         Respond only with the language name (e.g., English, Polish, etc.):\n{}",
        truncate_chars(content, MAX_DOCUMENT_CHARS)
    )
}

pub fn summarize(content: &str, language: &str) -> String {
    format!(
        "Summarize the following article content in {language}:\n{}",
        truncate_chars(content, MAX_DOCUMENT_CHARS)
    )
}

pub fn extract_concepts(content: &str, language: &str) -> String {
    format!(
        "Extract the main concepts and ideas from the following article content in {language}:\n{}",
        truncate_chars(content, MAX_DOCUMENT_CHARS)
    )
}

pub fn generate_query(title: &str, concepts: &str, content: &str) -> String {
    format!(
        "You are an assistant that generates concise search queries to find articles \
         related to a given text.\n\n\
         Title: {title}\n\
         Keywords: {concepts}\n\
         Content: {}...\n\n\
         Based on this information, generate a concise query to search for related topics.\n\
         Ensure the query is clear and avoids conversational or chat-based prompts.",
        truncate_chars(content, QUERY_CONTENT_CHARS)
    )
}

pub fn summarize_pdf_page(page_text: &str, language: &str) -> String {
    format!(
        "You are an assistant that summarizes sections of text from PDFs.\n\n\
         Language: {language}\n\
         Text: {}...\n\n\
         Summarize this section in {language} and highlight the most important points:",
        truncate_chars(page_text, PDF_PAGE_CHARS)
    )
}

/// Returns at most `max` leading characters of `s`, never splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
