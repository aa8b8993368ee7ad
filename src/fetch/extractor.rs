use scraper::{Html, Selector};

use crate::document::{Document, MISSING_TITLE};

/// Title from the first `<title>`, body from every `<p>` in document order
/// joined by single spaces.
pub(super) fn extract_document(html: &str) -> Document {
    let document = Html::parse_document(html);

    Document {
        title: extract_title(&document).unwrap_or_else(|| MISSING_TITLE.to_string()),
        body: extract_paragraphs(&document),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let title = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    if title.is_empty() { None } else { Some(title) }
}

fn extract_paragraphs(document: &Html) -> String {
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };
    document
        .select(&selector)
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}
