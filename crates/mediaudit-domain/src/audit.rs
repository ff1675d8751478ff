//! Canonical audit dimensions and the audit row type
//!
//! The audit table always holds exactly nine rows, one per canonical
//! dimension, in the fixed order of [`AUDIT_FIELD_KEYS`]. Every consumer
//! (UI tables, report generation, re-import) depends on this exact set,
//! so extraction output is always normalized to match it regardless of
//! what the model actually returned.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel used for "value not present in this document".
pub const MISSING_VALUE: &str = "-";

/// The nine canonical audit dimensions, in fixed order.
///
/// Ids are positional: `AUDIT_FIELD_KEYS[i]` always materializes with
/// id `i + 1`.
pub const AUDIT_FIELD_KEYS: [AuditFieldKey; 9] = [
    AuditFieldKey::StartDate,
    AuditFieldKey::EndDate,
    AuditFieldKey::GrossBudget,
    AuditFieldKey::NetBudget,
    AuditFieldKey::TotalImpressions,
    AuditFieldKey::SoldCpm,
    AuditFieldKey::CampaignObjective,
    AuditFieldKey::CtrCheck,
    AuditFieldKey::TargetLocations,
];

/// One canonical audit dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditFieldKey {
    /// Campaign flight start date
    #[serde(rename = "startDate")]
    StartDate,
    /// Campaign flight end date
    #[serde(rename = "endDate")]
    EndDate,
    /// Gross investment (total)
    #[serde(rename = "grossBudget")]
    GrossBudget,
    /// Net investment
    #[serde(rename = "netBudget")]
    NetBudget,
    /// Total contracted impressions
    #[serde(rename = "totalImpressions")]
    TotalImpressions,
    /// Average sold CPM
    #[serde(rename = "soldCPM")]
    SoldCpm,
    /// Campaign objective text
    #[serde(rename = "campaignObjective")]
    CampaignObjective,
    /// CTR goal check
    #[serde(rename = "ctrCheck")]
    CtrCheck,
    /// Target locations / addresses
    #[serde(rename = "targetLocations")]
    TargetLocations,
}

impl AuditFieldKey {
    /// Wire name of the key, as it appears in the exported record.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditFieldKey::StartDate => "startDate",
            AuditFieldKey::EndDate => "endDate",
            AuditFieldKey::GrossBudget => "grossBudget",
            AuditFieldKey::NetBudget => "netBudget",
            AuditFieldKey::TotalImpressions => "totalImpressions",
            AuditFieldKey::SoldCpm => "soldCPM",
            AuditFieldKey::CampaignObjective => "campaignObjective",
            AuditFieldKey::CtrCheck => "ctrCheck",
            AuditFieldKey::TargetLocations => "targetLocations",
        }
    }

    /// Stable numeric id of the dimension (1..=9).
    pub fn id(&self) -> u32 {
        AUDIT_FIELD_KEYS
            .iter()
            .position(|k| k == self)
            .map(|i| i as u32 + 1)
            .unwrap_or(0)
    }

    /// Human-readable row label for rendering.
    pub fn label(&self) -> &'static str {
        match self {
            AuditFieldKey::StartDate => "1. Start Date",
            AuditFieldKey::EndDate => "2. End Date",
            AuditFieldKey::GrossBudget => "3. Gross Investment (Total)",
            AuditFieldKey::NetBudget => "4. Net Investment",
            AuditFieldKey::TotalImpressions => "5. Total Impressions",
            AuditFieldKey::SoldCpm => "6. Sold CPM (Average)",
            AuditFieldKey::CampaignObjective => "7. Campaign Objective",
            AuditFieldKey::CtrCheck => "8. CTR Goal (> 1%)",
            AuditFieldKey::TargetLocations => "9. Locations / Addresses",
        }
    }
}

impl fmt::Display for AuditFieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reconciled audit row.
///
/// Holds the value each of the four source documents reported for a
/// canonical dimension (`"-"` when the document did not mention it), a
/// consistency verdict, and optional reviewer overrides that must survive
/// re-extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditItem {
    /// Row id, 1..=9, matching the canonical order
    pub id: u32,
    /// The canonical dimension this row audits
    pub field: AuditFieldKey,
    /// Value observed in the insertion order (PI)
    pub pi_value: String,
    /// Value observed in the commercial proposal
    pub proposal_value: String,
    /// Value observed in the email thread
    pub email_value: String,
    /// Value observed in the technical media plan (OPEC)
    pub pm_value: String,
    /// Whether the four observations agree
    pub is_consistent: bool,
    /// One-sentence explanation of a divergence, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Set by a human reviewer accepting a divergence after the fact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manually_approved: Option<bool>,
    /// Reviewer justification accompanying a manual approval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
}

impl AuditItem {
    /// Placeholder row for a dimension the model did not return.
    pub fn placeholder(field: AuditFieldKey, note: impl Into<String>) -> Self {
        Self {
            id: field.id(),
            field,
            pi_value: MISSING_VALUE.to_string(),
            proposal_value: MISSING_VALUE.to_string(),
            email_value: MISSING_VALUE.to_string(),
            pm_value: MISSING_VALUE.to_string(),
            is_consistent: false,
            notes: Some(note.into()),
            manually_approved: None,
            justification: None,
        }
    }
}
