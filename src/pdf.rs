//! PDF input: per-page text extraction and per-page summarization.
//!
//! A PDF's body is not its raw text. Each page with extractable text is
//! summarized on its own, and the page summaries joined by spaces become the
//! document body. Pages are summarized one after another; a page whose call
//! fails contributes [`PAGE_PLACEHOLDER`](crate::prompts::PAGE_PLACEHOLDER)
//! rather than failing the document.

use tracing::{debug, info};

use crate::document::{Document, PDF_TITLE};
use crate::llm::TextGenerator;
use crate::prompts;

/// Language requested for page summaries. Detection runs later, on the summaries.
pub const DEFAULT_PAGE_LANGUAGE: &str = "English";

#[derive(Debug, thiserror::Error)]
#[error("unreadable PDF: {0}")]
pub struct PdfError(String);

/// Text of every page, in page order. Blank pages are kept as (blank) entries.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, PdfError> {
    pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| PdfError(e.to_string()))
}

/// Parses on a blocking thread; a panic inside the PDF parser is reported as unreadable.
pub async fn extract_pages_blocking(bytes: Vec<u8>) -> Result<Vec<String>, PdfError> {
    tokio::task::spawn_blocking(move || extract_pages(&bytes))
        .await
        .map_err(|e| PdfError(format!("parser aborted: {e}")))?
}

pub async fn summarize_pages(llm: &impl TextGenerator, pages: &[String], language: &str) -> String {
    let mut summaries = Vec::new();

    for (index, page) in pages.iter().enumerate() {
        if page.trim().is_empty() {
            debug!(page = index + 1, "skipping page without text");
            continue;
        }
        let prompt = prompts::summarize_pdf_page(page, language);
        // The page site substitutes a placeholder, so this never yields Err.
        let summary = match prompts::SUMMARIZE_PDF_PAGE.call(llm, &prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(_) => prompts::PAGE_PLACEHOLDER.to_string(),
        };
        summaries.push(summary);
    }

    info!(
        pages = pages.len(),
        summarized = summaries.len(),
        "pdf pages summarized"
    );
    summaries.join(" ")
}

pub async fn pdf_document(
    llm: &impl TextGenerator,
    bytes: Vec<u8>,
    language: &str,
) -> Result<Document, PdfError> {
    let pages = extract_pages_blocking(bytes).await?;
    let body = summarize_pages(llm, &pages, language).await;
    Ok(Document {
        title: PDF_TITLE.to_string(),
        body,
    })
}
