use reqwest::Client;
use tracing::{debug, warn};

use super::types::{SearchRequest, SearchResponse};
use super::{ArticleRef, ArticleSearch, Locale, RESULT_COUNT, SearchError};
use crate::config::{ApiKey, SearchConfig};

/// Client for the Serper Google Search API.
#[derive(Clone)]
pub struct SerperClient {
    http: Client,
    api_key: ApiKey,
    endpoint: String,
}

impl SerperClient {
    pub fn new(http: Client, config: &SearchConfig) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_endpoint(http: Client, endpoint: &str) -> Self {
        Self {
            http,
            api_key: ApiKey::new("test-key"),
            endpoint: endpoint.to_string(),
        }
    }
}

impl ArticleSearch for SerperClient {
    async fn search(&self, query: &str, locale: Locale) -> Result<Vec<ArticleRef>, SearchError> {
        let request = SearchRequest {
            q: query,
            num: RESULT_COUNT,
            hl: locale.code(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("X-API-KEY", self.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let end = text.floor_char_boundary(200);
            warn!(status = %status, "search API error");
            return Err(SearchError::Api {
                code: status.as_u16(),
                message: format!("HTTP {status}: {}", &text[..end]),
            });
        }

        let body: SearchResponse = response.json().await?;
        let articles = to_article_refs(body);
        debug!(results = articles.len(), hl = locale.code(), "search complete");
        Ok(articles)
    }
}

fn to_article_refs(response: SearchResponse) -> Vec<ArticleRef> {
    response
        .organic
        .into_iter()
        .map(|item| ArticleRef {
            title: item.title,
            url: item.link,
            snippet: item.snippet.unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_organic_items_in_order_with_default_snippet() {
        let response: SearchResponse = serde_json::from_value(serde_json::json!({
            "organic": [
                {"title": "First", "link": "https://a.com", "snippet": "About A"},
                {"title": "Second", "link": "https://b.com"}
            ]
        }))
        .unwrap();

        let refs = to_article_refs(response);

        assert_eq!(
            refs,
            vec![
                ArticleRef {
                    title: "First".into(),
                    url: "https://a.com".into(),
                    snippet: "About A".into(),
                },
                ArticleRef {
                    title: "Second".into(),
                    url: "https://b.com".into(),
                    snippet: String::new(),
                },
            ]
        );
    }

    #[test]
    fn missing_organic_array_yields_no_results() {
        let response: SearchResponse =
            serde_json::from_value(serde_json::json!({"searchParameters": {}})).unwrap();
        assert!(to_article_refs(response).is_empty());
    }
}
