//! Text generation through a hosted LLM.

pub mod gemini;
mod types;

pub use gemini::GeminiClient;

use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("API quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("model returned no text (safety filter or empty response)")]
    EmptyResponse,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationParams {
    pub const fn new(temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature,
            max_output_tokens,
        }
    }
}

/// Abstraction over a prompt-in, text-out model.
/// Implemented by `GeminiClient` for production; mock implementations used in tests.
pub trait TextGenerator {
    async fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String, LlmError>;
}

/// What a call site does when its generation request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Propagate the error and abort the caller.
    Abort,
    /// Log the error and continue with a fixed placeholder text.
    Substitute(&'static str),
}

impl FailurePolicy {
    pub fn resolve(self, result: Result<String, LlmError>) -> Result<String, LlmError> {
        match (self, result) {
            (_, Ok(text)) => Ok(text),
            (FailurePolicy::Abort, Err(e)) => Err(e),
            (FailurePolicy::Substitute(placeholder), Err(e)) => {
                warn!(error = %e, "generation failed, substituting placeholder");
                Ok(placeholder.to_string())
            }
        }
    }
}

/// A named prompt site with its own sampling parameters and failure policy.
#[derive(Debug, Clone, Copy)]
pub struct CallSite {
    pub name: &'static str,
    pub params: GenerationParams,
    pub on_failure: FailurePolicy,
}

impl CallSite {
    pub async fn call(&self, llm: &impl TextGenerator, prompt: &str) -> Result<String, LlmError> {
        debug!(
            site = self.name,
            prompt_chars = prompt.chars().count(),
            "calling model"
        );
        self.on_failure
            .resolve(llm.generate(prompt, self.params).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_propagates_error() {
        let result = FailurePolicy::Abort.resolve(Err(LlmError::RateLimited));
        assert!(matches!(result, Err(LlmError::RateLimited)));
    }

    #[test]
    fn substitute_replaces_error_with_placeholder() {
        let result = FailurePolicy::Substitute("n/a").resolve(Err(LlmError::EmptyResponse));
        assert_eq!(result.unwrap(), "n/a");
    }

    #[test]
    fn success_passes_through_either_policy() {
        for policy in [FailurePolicy::Abort, FailurePolicy::Substitute("n/a")] {
            assert_eq!(policy.resolve(Ok("text".into())).unwrap(), "text");
        }
    }
}
