//! Gemini Provider Implementation
//!
//! Talks to the Google Generative Language REST API. The provider maps
//! transport and status failures onto the [`LlmError`] taxonomy; the
//! retry ladder lives upstream and owns all retry decisions, so a single
//! call here is exactly one HTTP request.

use crate::{GenerateRequest, GenerativeModel, LlmError, Part};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default per-request transport timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Provider backed by the Generative Language `generateContent` API.
pub struct GeminiProvider {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    system_instruction: ApiContent<'a>,
    contents: Vec<ApiContent<'a>>,
    generation_config: ApiGenerationConfig<'a>,
}

#[derive(Serialize)]
struct ApiContent<'a> {
    parts: Vec<ApiPart<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiPart<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<ApiInlineData<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiInlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig<'a> {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
}

#[derive(Deserialize)]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiCandidateContent>,
}

#[derive(Deserialize)]
struct ApiCandidateContent {
    #[serde(default)]
    parts: Vec<ApiCandidatePart>,
}

#[derive(Deserialize)]
struct ApiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl ApiResponse {
    /// Concatenate the text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

impl GeminiProvider {
    /// Provider against the public endpoint.
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Provider against a custom endpoint (testing, proxies).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    fn body<'a>(request: &'a GenerateRequest) -> ApiRequest<'a> {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => ApiPart {
                    text: Some(text),
                    inline_data: None,
                },
                Part::Inline { mime_type, data } => ApiPart {
                    text: None,
                    inline_data: Some(ApiInlineData {
                        mime_type,
                        data,
                    }),
                },
            })
            .collect();

        ApiRequest {
            system_instruction: ApiContent {
                parts: vec![ApiPart {
                    text: Some(&request.system_instruction),
                    inline_data: None,
                }],
            },
            contents: vec![ApiContent { parts }],
            generation_config: ApiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
                response_mime_type: request
                    .response_schema
                    .as_ref()
                    .map(|_| "application/json"),
                response_schema: request.response_schema.as_ref(),
            },
        }
    }
}

impl Default for GeminiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeModel for GeminiProvider {
    async fn generate(
        &self,
        credential: &str,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<String, LlmError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, model, credential
        );

        let response = self
            .client
            .post(&url)
            .json(&Self::body(request))
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(match status.as_u16() {
                429 => LlmError::RateLimited(message),
                404 => LlmError::ModelNotFound(model.to_string()),
                502 | 503 | 504 => LlmError::Unavailable(message),
                code => LlmError::Http { status: code, message },
            });
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        Ok(parsed.text())
    }
}
