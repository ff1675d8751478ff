//! Best-effort refinement of reviewer-written text
//!
//! Polishes free-text notes into professional audit language. This is a
//! convenience feature: any failure, from a missing credential to a rate
//! limit, quietly returns the input untouched.

use crate::campaign::CampaignExtractor;
use mediaudit_llm::GenerateRequest;
use tracing::debug;

/// Lighter model for plain-text rewriting; no structured output needed.
pub const REFINE_MODEL: &str = "gemini-1.5-flash";

const REFINE_SYSTEM_INSTRUCTION: &str = "You are an editor of media audit reports. \
Rewrite the user's text into concise, professional auditing language in the same \
language the text is written in. Keep every fact and number unchanged. Return ONLY \
the rewritten text, with no preamble and no quotes.";

const REFINE_MAX_OUTPUT_TOKENS: u32 = 2_000;

impl CampaignExtractor {
    /// Rewrite `text` into audit register; `context` names the field the
    /// text belongs to. Returns the input unchanged on any failure.
    pub async fn refine_text(&self, text: &str, context: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }
        let Some(credential) = self.credentials().first() else {
            return text.to_string();
        };

        let prompt = format!("Field: {context}\n\nText to refine:\n{text}");
        let request = GenerateRequest::new(REFINE_SYSTEM_INSTRUCTION, prompt)
            .with_max_output_tokens(REFINE_MAX_OUTPUT_TOKENS);

        match self.provider().generate(credential, REFINE_MODEL, &request).await {
            Ok(refined) if !refined.trim().is_empty() => refined.trim().to_string(),
            Ok(_) => text.to_string(),
            Err(err) => {
                debug!(error = %err, "refinement unavailable, keeping original text");
                text.to_string()
            }
        }
    }
}
