//! Email thread update extraction
//!
//! A later upload of the thread export extracts only the timeline, in a
//! single call without the full retry ladder, and is appended to the
//! record as a new batch. The model may answer with a bare array or the
//! `{"emails": [...]}` wrapper; both are accepted.

use crate::campaign::{sanitize_emails, CampaignExtractor};
use crate::cancel::RunToken;
use crate::error::ExtractorError;
use crate::json::parse_model_json;
use crate::prompt::{
    email_response_schema, SourceDocument, EMAIL_PROMPT, EMAIL_SYSTEM_INSTRUCTION,
};
use crate::retry::{classify, FailureKind};
use chrono::Utc;
use mediaudit_domain::{CampaignRecord, EmailBatch, EmailInteraction};
use mediaudit_llm::{GenerateRequest, Part};
use serde_json::Value;
use tracing::info;

const EMAIL_MAX_OUTPUT_TOKENS: u32 = 12_000;

/// Shown instead of the raw quota error, which reads like a crash.
const RATE_LIMIT_HINT: &str =
    "The AI is at its usage limit right now. Wait a moment and upload the thread again.";

impl CampaignExtractor {
    /// Extract the email timeline from a thread export and append it to
    /// `record` as a new batch, renumbering the flat timeline.
    pub async fn extract_email_updates(
        &self,
        document: &SourceDocument,
        record: &mut CampaignRecord,
        run: &RunToken,
    ) -> Result<usize, ExtractorError> {
        let credential = self
            .credentials()
            .first()
            .ok_or_else(|| ExtractorError::Configuration("No API credentials available".into()))?;
        let model = DEFAULT_EMAIL_MODEL;

        let mime = if document.mime_type.is_empty() {
            "application/pdf"
        } else {
            &document.mime_type
        };
        let request = GenerateRequest::new(EMAIL_SYSTEM_INSTRUCTION, "")
            .with_parts(vec![
                Part::text(EMAIL_PROMPT),
                Part::inline_bytes(mime, &document.bytes),
            ])
            .with_response_schema(email_response_schema())
            .with_max_output_tokens(EMAIL_MAX_OUTPUT_TOKENS);

        let outcome = self.provider().generate(credential, model, &request).await;
        run.ensure_current()?;

        let text = outcome.map_err(|e| match classify(&e) {
            FailureKind::RateLimited => ExtractorError::Llm(RATE_LIMIT_HINT.to_string()),
            _ => ExtractorError::from(e),
        })?;

        let value = parse_model_json(&text)?;
        let emails = extract_email_array(&value);
        if emails.is_empty() {
            return Err(ExtractorError::MalformedResponse(
                "no emails found in the thread export".to_string(),
            ));
        }

        let count = emails.len();
        append_email_batch(record, emails, &document.file_name);
        info!(count, file = %document.file_name, "email thread batch appended");
        Ok(count)
    }
}

/// Default model for the single-call email extraction.
pub const DEFAULT_EMAIL_MODEL: &str = "gemini-3-flash-preview";

fn extract_email_array(value: &Value) -> Vec<EmailInteraction> {
    match value {
        Value::Array(_) => sanitize_emails(Some(value)),
        Value::Object(obj) => sanitize_emails(obj.get("emails")),
        _ => Vec::new(),
    }
}

/// Append a new batch and rebuild the flat timeline across all batches
/// with dense ids.
pub fn append_email_batch(
    record: &mut CampaignRecord,
    emails: Vec<EmailInteraction>,
    file_name: &str,
) {
    record.email_batches.push(EmailBatch {
        id: format!("batch_{}", Utc::now().timestamp_millis()),
        file_name: file_name.to_string(),
        uploaded_at: Utc::now().to_rfc3339(),
        emails,
    });

    record.emails = record
        .email_batches
        .iter()
        .flat_map(|batch| batch.emails.iter().cloned())
        .enumerate()
        .map(|(idx, mut email)| {
            email.id = idx as u32 + 1;
            email
        })
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediaudit_domain::EmailKind;
    use serde_json::json;

    fn email(id: u32, summary: &str) -> EmailInteraction {
        EmailInteraction {
            id,
            date: "01/03".to_string(),
            sender: "ana@agencia.com".to_string(),
            summary: summary.to_string(),
            kind: EmailKind::Negotiation,
        }
    }

    #[test]
    fn test_extract_email_array_accepts_bare_array_and_wrapper() {
        let bare = json!([{"sender": "a", "summary": "s", "type": "initial"}]);
        let wrapped = json!({"emails": [{"sender": "a", "summary": "s"}]});
        assert_eq!(extract_email_array(&bare).len(), 1);
        assert_eq!(extract_email_array(&wrapped).len(), 1);
        assert!(extract_email_array(&json!("text")).is_empty());
    }

    #[test]
    fn test_append_batch_renumbers_across_batches() {
        let mut record = CampaignRecord::default();
        append_email_batch(&mut record, vec![email(1, "kickoff"), email(2, "budget")], "a.pdf");
        append_email_batch(&mut record, vec![email(1, "approval")], "b.pdf");

        assert_eq!(record.email_batches.len(), 2);
        assert_eq!(record.emails.len(), 3);
        let ids: Vec<u32> = record.emails.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(record.emails[2].summary, "approval");
    }
}
