//! Report rendering: Markdown for the terminal, HTML for the web form.
//!
//! Both renderers emit the same sections in the same order: title, link
//! (URL inputs only), language, summary, concepts, query, related articles.

use std::fmt::Write;

use crate::pipeline::Report;

pub fn to_markdown(report: &Report) -> String {
    let result = &report.result;
    let language = sanitize_heading(&result.language);
    let mut out = String::new();

    let _ = writeln!(out, "## Original Title\n\n{}\n", report.document.title);
    if let Some(url) = &report.source_url {
        let _ = writeln!(out, "[Original Link]({})\n", escape_md_link(url));
    }
    let _ = writeln!(out, "## Detected Language\n\n{}\n", result.language);
    let _ = writeln!(out, "## Summary ({language})\n\n{}\n", result.summary.trim());
    let _ = writeln!(out, "## Key Concepts ({language})\n\n{}\n", result.concepts.trim());
    let _ = writeln!(out, "## Generated Search Query\n\n{}\n", result.query);
    let _ = writeln!(out, "## Related Articles ({language})\n");

    if result.related_articles.is_empty() {
        out.push_str("No related articles found.\n");
    }
    for article in &result.related_articles {
        let _ = writeln!(out, "**{}**\n", article.title);
        if !article.snippet.is_empty() {
            let _ = writeln!(out, "{}\n", article.snippet);
        }
        let _ = writeln!(out, "[Read More]({})\n", escape_md_link(&article.url));
    }

    out
}

/// Body fragment for the results page. Every interpolated value is escaped.
pub fn to_html(report: &Report) -> String {
    let result = &report.result;
    let language = escape_html(&result.language);
    let mut out = String::new();

    section(&mut out, "Original Title", &report.document.title);
    if let Some(url) = &report.source_url {
        let _ = writeln!(
            out,
            "<p><a href=\"{}\">Original Link</a></p>",
            escape_html(url)
        );
    }
    section(&mut out, "Detected Language", &result.language);
    section(&mut out, &format!("Summary ({})", result.language), &result.summary);
    section(
        &mut out,
        &format!("Key Concepts ({})", result.language),
        &result.concepts,
    );
    section(&mut out, "Generated Search Query", &result.query);

    let _ = writeln!(out, "<h2>Related Articles ({language})</h2>");
    if result.related_articles.is_empty() {
        out.push_str("<p>No related articles found.</p>\n");
    }
    for article in &result.related_articles {
        let _ = writeln!(
            out,
            "<article><h3>{}</h3><p>{}</p><p><a href=\"{}\">Read More</a></p></article>",
            escape_html(&article.title),
            escape_html(&article.snippet),
            escape_html(&article.url)
        );
    }

    out
}

fn section(out: &mut String, heading: &str, body: &str) {
    let _ = writeln!(
        out,
        "<h2>{}</h2>\n<p>{}</p>",
        escape_html(heading),
        escape_html(body.trim())
    );
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape characters that break Markdown link syntax: `[`, `]`, `(`, `)`.
fn escape_md_link(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '[' | ']' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Model output can contain newlines, which would break heading structure.
fn sanitize_heading(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::pipeline::AnalysisResult;
    use crate::search::ArticleRef;

    fn report(source_url: Option<&str>) -> Report {
        Report {
            document: Document {
                title: "Rust <Ownership>".into(),
                body: "body".into(),
            },
            source_url: source_url.map(str::to_string),
            result: AnalysisResult {
                language: "English".into(),
                summary: "A summary.".into(),
                concepts: "ownership, borrowing".into(),
                query: "rust ownership".into(),
                related_articles: vec![
                    ArticleRef {
                        title: "The Book".into(),
                        url: "https://doc.rust-lang.org/book/(ch04)".into(),
                        snippet: "Chapter 4".into(),
                    },
                    ArticleRef {
                        title: "Blog".into(),
                        url: "https://blog.example".into(),
                        snippet: String::new(),
                    },
                ],
            },
        }
    }

    #[test]
    fn markdown_sections_in_fixed_order() {
        let text = to_markdown(&report(Some("https://example.com/a")));

        let order = [
            "## Original Title",
            "[Original Link](https://example.com/a)",
            "## Detected Language",
            "## Summary (English)",
            "## Key Concepts (English)",
            "## Generated Search Query",
            "## Related Articles (English)",
            "**The Book**",
            "**Blog**",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|needle| text.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "got:\n{text}");
    }

    #[test]
    fn markdown_escapes_link_targets() {
        let text = to_markdown(&report(None));
        assert!(text.contains(r"[Read More](https://doc.rust-lang.org/book/\(ch04\))"));
    }

    #[test]
    fn markdown_omits_link_for_pdf_input() {
        let text = to_markdown(&report(None));
        assert!(!text.contains("Original Link"));
    }

    #[test]
    fn markdown_heading_language_has_no_newlines() {
        let mut r = report(None);
        r.result.language = "English\nor not".into();
        let text = to_markdown(&r);
        assert!(text.contains("## Summary (English or not)"));
    }

    #[test]
    fn html_escapes_model_and_page_text() {
        let html = to_html(&report(Some("https://example.com/?a=1&b=2")));
        assert!(html.contains("Rust &lt;Ownership&gt;"));
        assert!(html.contains("href=\"https://example.com/?a=1&amp;b=2\""));
        assert!(!html.contains("<Ownership>"));
    }

    #[test]
    fn escape_md_link_handles_brackets() {
        assert_eq!(escape_md_link("normal text"), "normal text");
        assert_eq!(escape_md_link("a[b]c(d)e"), r"a\[b\]c\(d\)e");
    }

    #[test]
    fn sanitize_heading_replaces_newlines() {
        assert_eq!(sanitize_heading("line1\nline2\rline3"), "line1 line2 line3");
    }
}
