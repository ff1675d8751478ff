//! Error types for the extraction pipeline

use mediaudit_llm::LlmError;
use thiserror::Error;

/// Errors that can surface from the extraction pipeline
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// No credentials available, or another fatal setup problem
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The model identifier itself is invalid (deployment mistake)
    #[error("Model not found: {0}. Check the configured model list.")]
    InvalidModel(String),

    /// No parseable JSON could be recovered from the response
    #[error("Response contains no parseable JSON: {0}")]
    MalformedResponse(String),

    /// Every credential and model combination was exhausted
    #[error("Extraction failed after exhausting all credentials and models: {0}")]
    Exhausted(String),

    /// A newer run superseded this one; the result must be discarded
    #[error("Operation superseded by a newer run")]
    Stale,

    /// Non-retryable failure from the generative endpoint
    #[error("LLM error: {0}")]
    Llm(String),
}

impl From<LlmError> for ExtractorError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Configuration(msg) => ExtractorError::Configuration(msg),
            LlmError::ModelNotFound(model) => ExtractorError::InvalidModel(model),
            other => ExtractorError::Llm(other.to_string()),
        }
    }
}
