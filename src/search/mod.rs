//! Related-article lookup through a web search API.

mod locale;
pub mod serper;
mod types;

pub use locale::Locale;
pub use serper::SerperClient;

/// Number of organic results requested per query.
pub const RESULT_COUNT: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRef {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Abstraction for the related-article search backend.
/// Implemented by `SerperClient` for production; mock implementations used in tests.
pub trait ArticleSearch {
    async fn search(&self, query: &str, locale: Locale) -> Result<Vec<ArticleRef>, SearchError>;
}
