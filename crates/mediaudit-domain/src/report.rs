//! Performance report extracted from delivery exports

use serde::{Deserialize, Serialize};

/// Outcome of checking one campaign goal against delivered numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    /// Goal met
    Hit,
    /// Goal partially met
    Partial,
    /// Goal missed
    Miss,
    /// Could not be determined from the report
    Unknown,
}

impl Default for GoalStatus {
    fn default() -> Self {
        GoalStatus::Unknown
    }
}

/// Aggregate delivery numbers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Delivered impressions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impressions: Option<f64>,
    /// Delivered clicks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clicks: Option<f64>,
    /// Click-through rate, percentual (0..=100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctr: Option<f64>,
}

/// Per-publisher delivery metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublisherMetric {
    /// Normalized publisher name
    pub name: String,
    /// Impressions attributed to the publisher
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impressions: Option<f64>,
    /// Clicks attributed to the publisher
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clicks: Option<f64>,
    /// CTR, percentual
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctr: Option<f64>,
}

/// One slice of a demographic breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownItem {
    /// Slice label (e.g. "Female", "25-34")
    pub label: String,
    /// Share of delivery, percentual
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share: Option<f64>,
}

/// Demographic breakdowns of delivery.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Demographics {
    /// By gender
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Vec<BreakdownItem>>,
    /// By age bracket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Vec<BreakdownItem>>,
}

/// Per-creative delivery metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creative {
    /// Creative name
    pub name: String,
    /// Delivered impressions
    pub impressions: f64,
    /// Delivered clicks
    pub clicks: f64,
    /// CTR, percentual
    pub ctr: f64,
}

/// One goal cross-checked against the briefing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalCheckItem {
    /// Goal description
    pub goal: String,
    /// Contracted target, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Delivered value, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    /// Verdict
    pub status: GoalStatus,
    /// One-line explanation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Goal check section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalsCheck {
    /// Verdict across all goals
    pub overall_status: GoalStatus,
    /// Individual goal verdicts
    pub items: Vec<GoalCheckItem>,
}

/// Structured performance report extracted from a delivery export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    /// When the report was extracted (RFC 3339)
    pub generated_at: String,
    /// Name of the source file
    pub source_file_name: String,
    /// Mime type of the source file
    pub source_file_type: String,
    /// Aggregate delivery numbers
    pub summary: ReportSummary,
    /// Per-publisher metrics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publishers: Option<Vec<PublisherMetric>>,
    /// Demographic breakdowns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demographics: Option<Demographics>,
    /// Per-creative metrics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creatives: Option<Vec<Creative>>,
    /// Free-text considerations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub considerations: Option<Vec<String>>,
    /// Goal cross-check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals_check: Option<GoalsCheck>,
}
