use crate::llm::{LlmError, TextGenerator};
use crate::prompts;
use crate::search::{ArticleRef, ArticleSearch, Locale, SearchError};

/// Title used in the query prompt when the document has none.
pub const FALLBACK_TITLE: &str = "Document";

/// The label is whatever the model answers, trimmed; it is never validated.
pub async fn detect_language(llm: &impl TextGenerator, content: &str) -> Result<String, LlmError> {
    let label = prompts::DETECT_LANGUAGE
        .call(llm, &prompts::detect_language(content))
        .await?;
    Ok(label.trim().to_string())
}

pub async fn summarize(
    llm: &impl TextGenerator,
    content: &str,
    language: &str,
) -> Result<String, LlmError> {
    prompts::SUMMARIZE
        .call(llm, &prompts::summarize(content, language))
        .await
}

pub async fn extract_concepts(
    llm: &impl TextGenerator,
    content: &str,
    language: &str,
) -> Result<String, LlmError> {
    prompts::EXTRACT_CONCEPTS
        .call(llm, &prompts::extract_concepts(content, language))
        .await
}

pub async fn generate_query(
    llm: &impl TextGenerator,
    title: &str,
    concepts: &str,
    content: &str,
) -> Result<String, LlmError> {
    let title = if title.trim().is_empty() {
        FALLBACK_TITLE
    } else {
        title
    };
    let query = prompts::GENERATE_QUERY
        .call(llm, &prompts::generate_query(title, concepts, content))
        .await?;
    Ok(query.trim().to_string())
}

pub async fn find_related(
    search: &impl ArticleSearch,
    query: &str,
    language: &str,
) -> Result<Vec<ArticleRef>, SearchError> {
    search.search(query, Locale::from_language(language)).await
}
