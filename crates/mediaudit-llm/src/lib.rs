//! Mediaudit LLM Provider Layer
//!
//! The boundary to the external generative-AI capability.
//!
//! # Architecture
//!
//! This crate defines the [`GenerativeModel`] trait consumed by the
//! extraction pipeline, together with everything the pipeline needs to
//! talk to the real endpoint: the request payload types, the error
//! taxonomy the retry engine classifies, per-purpose credential rotation,
//! and daily usage tracking.
//!
//! # Providers
//!
//! - [`MockProvider`]: Scripted outcomes for deterministic tests
//! - [`GeminiProvider`]: Google Generative Language REST API integration
//!
//! # Examples
//!
//! ```
//! use mediaudit_llm::{GenerateRequest, MockProvider, GenerativeModel};
//!
//! # async fn example() {
//! let provider = MockProvider::new("{\"ok\":true}");
//! let request = GenerateRequest::new("system", "prompt");
//! let text = provider
//!     .generate("key-a", "gemini-3-flash-preview", &request)
//!     .await
//!     .unwrap();
//! assert_eq!(text, "{\"ok\":true}");
//! # }
//! ```

#![warn(missing_docs)]

pub mod gemini;
pub mod rotation;
pub mod usage;

pub use gemini::GeminiProvider;
pub use rotation::{pick_credential, Purpose};
pub use usage::{increment_daily_usage, load_daily_usage};

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors that can occur when calling the generative endpoint
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    /// The endpoint rejected the call for quota reasons (HTTP 429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The endpoint is temporarily unavailable (HTTP 502/503/504)
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The model identifier itself is invalid (HTTP 404)
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// The call succeeded but returned no usable text
    #[error("Empty response from the model")]
    EmptyResponse,

    /// The call succeeded but the payload is not what was asked for
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Network or transport failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// Missing or unusable credentials
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Any other HTTP failure
    #[error("HTTP {status}: {message}")]
    Http {
        /// Status code returned by the endpoint
        status: u16,
        /// Response body or status text
        message: String,
    },
}

/// One part of a multi-part prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Plain prompt text
    Text(String),
    /// Binary attachment, already base64-encoded
    Inline {
        /// Mime type of the attachment
        mime_type: String,
        /// Base64-encoded bytes
        data: String,
    },
}

impl Part {
    /// Text part from anything string-like
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }

    /// Inline binary part from raw bytes; encoding happens here
    pub fn inline_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        use base64::Engine as _;
        Part::Inline {
            mime_type: mime_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }
}

/// A single logical request to the generative endpoint.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// System instruction framing the model's role
    pub system_instruction: String,
    /// Prompt parts, text and binary attachments interleaved
    pub parts: Vec<Part>,
    /// Target output schema, when structured JSON output is requested
    pub response_schema: Option<Value>,
    /// Sampling temperature
    pub temperature: f32,
    /// Output size cap
    pub max_output_tokens: u32,
}

impl GenerateRequest {
    /// Request with one text part and default sampling settings.
    pub fn new(system_instruction: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            parts: vec![Part::text(prompt)],
            response_schema: None,
            temperature: 0.1,
            max_output_tokens: 8192,
        }
    }

    /// Replace the prompt parts.
    pub fn with_parts(mut self, parts: Vec<Part>) -> Self {
        self.parts = parts;
        self
    }

    /// Request structured JSON output conforming to `schema`.
    pub fn with_response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the output size cap.
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }
}

/// The external generative-AI capability.
///
/// Schema conformance of the returned text is explicitly NOT trusted;
/// the caller owns recovery and validation.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Run one generation call with the given credential and model id,
    /// returning the raw response text.
    async fn generate(
        &self,
        credential: &str,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<String, LlmError>;
}

/// One call recorded by the [`MockProvider`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Credential the call used
    pub credential: String,
    /// Model id the call used
    pub model: String,
    /// Temperature of the request
    pub temperature: f32,
    /// System instruction of the request
    pub system_instruction: String,
}

/// Mock provider with scripted outcomes for deterministic testing.
///
/// Outcomes queued with [`MockProvider::push_outcome`] are returned in
/// order; once the queue is empty every call yields the default response.
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    outcomes: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockProvider {
    /// Provider that answers every call with `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue the outcome for the next unscripted call.
    pub fn push_outcome(&self, outcome: Result<String, LlmError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    /// Queue `error` for the next call.
    pub fn push_error(&self, error: LlmError) {
        self.push_outcome(Err(error));
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Copies of all recorded calls.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

#[async_trait]
impl GenerativeModel for MockProvider {
    async fn generate(
        &self,
        credential: &str,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            credential: credential.to_string(),
            model: model.to_string(),
            temperature: request.temperature,
            system_instruction: request.system_instruction.clone(),
        });

        match self.outcomes.lock().unwrap().pop_front() {
            Some(outcome) => outcome,
            None => Ok(self.default_response.clone()),
        }
    }
}
