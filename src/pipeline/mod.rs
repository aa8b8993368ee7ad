//! Analysis orchestration: extraction followed by five dependent stages.
//!
//! `Detect → Summarize → ExtractConcepts → GenerateQuery → Search`. Each stage
//! consumes the previous stage's output, nothing runs in parallel, and the
//! first failure aborts the run without a partial result.

mod error;
pub mod steps;

use std::fmt;
use std::time::Instant;

use reqwest::Client;
use tracing::info;

pub use error::AnalysisError;

use crate::document::{Document, Input, Interaction};
use crate::fetch::{self, HostPolicy};
use crate::llm::TextGenerator;
use crate::pdf;
use crate::search::{ArticleRef, ArticleSearch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Detect,
    Summarize,
    ExtractConcepts,
    GenerateQuery,
    Search,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Detect => "language detection",
            Stage::Summarize => "summarization",
            Stage::ExtractConcepts => "concept extraction",
            Stage::GenerateQuery => "query generation",
            Stage::Search => "related-article search",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub language: String,
    pub summary: String,
    pub concepts: String,
    pub query: String,
    pub related_articles: Vec<ArticleRef>,
}

/// Everything the presentation layer renders for one run.
#[derive(Debug, Clone)]
pub struct Report {
    pub document: Document,
    pub source_url: Option<String>,
    pub result: AnalysisResult,
}

pub struct Pipeline<G, S> {
    llm: G,
    search: S,
    http: Client,
    host_policy: HostPolicy,
    pdf_language: String,
}

impl<G: TextGenerator, S: ArticleSearch> Pipeline<G, S> {
    pub fn new(llm: G, search: S, http: Client) -> Self {
        Self {
            llm,
            search,
            http,
            host_policy: HostPolicy::default(),
            pdf_language: pdf::DEFAULT_PAGE_LANGUAGE.to_string(),
        }
    }

    pub fn with_host_policy(mut self, policy: HostPolicy) -> Self {
        self.host_policy = policy;
        self
    }

    pub fn with_pdf_language(mut self, language: impl Into<String>) -> Self {
        self.pdf_language = language.into();
        self
    }

    pub async fn run(&self, interaction: Interaction) -> Result<Report, AnalysisError> {
        let input = interaction.into_input()?;
        let source_url = input.source_url().map(str::to_string);
        let document = self.extract(input).await?;
        let result = self.analyze(&document).await?;
        Ok(Report {
            document,
            source_url,
            result,
        })
    }

    pub async fn extract(&self, input: Input) -> Result<Document, AnalysisError> {
        match input {
            Input::Url(url) => {
                info!(url = %url, "extracting web page");
                Ok(fetch::fetch_document(&self.http, &url, self.host_policy).await?)
            }
            Input::Pdf(upload) => {
                info!(
                    file = %upload.file_name,
                    bytes = upload.bytes.len(),
                    "extracting pdf"
                );
                Ok(pdf::pdf_document(&self.llm, upload.bytes, &self.pdf_language).await?)
            }
        }
    }

    pub async fn analyze(&self, document: &Document) -> Result<AnalysisResult, AnalysisError> {
        if document.body.trim().is_empty() {
            return Err(AnalysisError::EmptyDocument);
        }
        let content = document.body.as_str();
        let started = Instant::now();

        info!(stage = %Stage::Detect, "stage started");
        let language = steps::detect_language(&self.llm, content)
            .await
            .map_err(AnalysisError::llm(Stage::Detect))?;

        info!(stage = %Stage::Summarize, language = %language, "stage started");
        let summary = steps::summarize(&self.llm, content, &language)
            .await
            .map_err(AnalysisError::llm(Stage::Summarize))?;

        info!(stage = %Stage::ExtractConcepts, "stage started");
        let concepts = steps::extract_concepts(&self.llm, content, &language)
            .await
            .map_err(AnalysisError::llm(Stage::ExtractConcepts))?;

        info!(stage = %Stage::GenerateQuery, "stage started");
        let query = steps::generate_query(&self.llm, &document.title, &concepts, content)
            .await
            .map_err(AnalysisError::llm(Stage::GenerateQuery))?;

        info!(stage = %Stage::Search, query = %query, "stage started");
        let related_articles = steps::find_related(&self.search, &query, &language).await?;

        info!(
            related = related_articles.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis complete"
        );

        Ok(AnalysisResult {
            language,
            summary,
            concepts,
            query,
            related_articles,
        })
    }
}
