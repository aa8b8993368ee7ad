use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub q: &'a str,
    pub num: u8,
    pub hl: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
pub struct OrganicResult {
    pub title: String,
    pub link: String,
    pub snippet: Option<String>,
}
