use crate::fetch::FetchError;
use crate::llm::LlmError;
use crate::pdf::PdfError;
use crate::search::SearchError;

use super::Stage;

/// Why an analysis produced no result. Any variant aborts the whole run.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Fetch(FetchError),

    #[error(transparent)]
    Parse(#[from] PdfError),

    #[error("{stage} failed: {source}")]
    LlmCall {
        stage: Stage,
        #[source]
        source: LlmError,
    },

    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("document has no text to analyze")]
    EmptyDocument,
}

impl From<FetchError> for AnalysisError {
    fn from(e: FetchError) -> Self {
        if e.is_invalid_input() {
            AnalysisError::InvalidInput(e.to_string())
        } else {
            AnalysisError::Fetch(e)
        }
    }
}

impl AnalysisError {
    pub(crate) fn llm(stage: Stage) -> impl FnOnce(LlmError) -> Self {
        move |source| AnalysisError::LlmCall { stage, source }
    }

    /// Short, detail-free text for end users; the full error belongs in the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalysisError::InvalidInput(_) => {
                "The input is not valid. Please provide a well-formed http(s) URL or a PDF file."
            }
            AnalysisError::EmptyDocument => "No text could be extracted from the document.",
            _ => "An error occurred while analyzing the content. Please try again later.",
        }
    }
}
