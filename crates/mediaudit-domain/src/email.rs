//! Extracted email interactions and upload batches

use serde::{Deserialize, Serialize};

/// Category of an email interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailKind {
    /// First contact / briefing
    Initial,
    /// Back-and-forth on terms, values, dates
    Negotiation,
    /// Sign-off of the campaign or a change
    Approval,
}

impl Default for EmailKind {
    fn default() -> Self {
        EmailKind::Negotiation
    }
}

/// One extracted email message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailInteraction {
    /// Sequential id within the campaign (1-based)
    pub id: u32,
    /// Date as it appears in the thread (free text)
    pub date: String,
    /// Sender name or address
    pub sender: String,
    /// Short summary of the message
    pub summary: String,
    /// Interaction category
    #[serde(rename = "type")]
    pub kind: EmailKind,
}

/// A group of emails extracted from one uploaded file.
///
/// Batches let a later thread upload extend the timeline without
/// discarding interactions extracted from earlier files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailBatch {
    /// Batch identifier
    pub id: String,
    /// Name of the file the batch came from
    pub file_name: String,
    /// Upload timestamp (RFC 3339)
    pub uploaded_at: String,
    /// Member interactions
    pub emails: Vec<EmailInteraction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&EmailKind::Initial).unwrap(),
            "\"initial\""
        );
        let parsed: EmailKind = serde_json::from_str("\"approval\"").unwrap();
        assert_eq!(parsed, EmailKind::Approval);
    }

    #[test]
    fn test_interaction_uses_type_key() {
        let email = EmailInteraction {
            id: 1,
            date: "02/03/2025".to_string(),
            sender: "ana@agency.example".to_string(),
            summary: "Requested a revised net value".to_string(),
            kind: EmailKind::Negotiation,
        };
        let json = serde_json::to_string(&email).unwrap();
        assert!(json.contains("\"type\":\"negotiation\""));
        let back: EmailInteraction = serde_json::from_str(&json).unwrap();
        assert_eq!(email, back);
    }
}
