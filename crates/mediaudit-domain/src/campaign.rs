//! The campaign record, root of the data model

use crate::audit::AuditItem;
use crate::email::{EmailBatch, EmailInteraction};
use crate::report::PerformanceReport;
use crate::strategy::StrategyItem;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a campaign record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    /// Running campaign (set after a successful extraction)
    Active,
    /// Awaiting approval
    Pending,
    /// Empty or partially filled record
    Draft,
}

impl Default for CampaignStatus {
    fn default() -> Self {
        CampaignStatus::Draft
    }
}

/// Audience targeting descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Targeting {
    /// Geographic targets
    pub geo: Vec<String>,
    /// Demographic segments
    pub demographics: Vec<String>,
    /// Interest segments
    pub interests: Vec<String>,
    /// Device targets
    pub devices: Vec<String>,
    /// Brand-safety constraints
    pub brand_safety: String,
}

impl Default for Targeting {
    fn default() -> Self {
        Self {
            geo: Vec::new(),
            demographics: Vec::new(),
            interests: Vec::new(),
            devices: Vec::new(),
            brand_safety: "-".to_string(),
        }
    }
}

/// Legal and commercial terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalTerms {
    /// Payment terms
    pub payment_terms: String,
    /// Agency commission
    pub agency_commission: String,
    /// Cancellation policy
    pub cancellation_policy: String,
    /// Contractual penalty
    pub penalty: String,
}

impl Default for LegalTerms {
    fn default() -> Self {
        Self {
            payment_terms: "-".to_string(),
            agency_commission: "-".to_string(),
            cancellation_policy: "-".to_string(),
            penalty: "-".to_string(),
        }
    }
}

/// Legal entities named in the insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PiEntities {
    /// Contracting company's registered name
    pub razao_social: String,
    /// Contracted media vehicle
    pub vehicle: String,
}

impl Default for PiEntities {
    fn default() -> Self {
        Self {
            razao_social: "-".to_string(),
            vehicle: "-".to_string(),
        }
    }
}

/// Free-text specifics of the insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiSpecifics {
    /// Description of the contracted delivery
    pub description: String,
    /// Additional considerations
    pub considerations: String,
}

impl Default for PiSpecifics {
    fn default() -> Self {
        Self {
            description: "-".to_string(),
            considerations: "-".to_string(),
        }
    }
}

/// Links to campaign assets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetLinks {
    /// Commercial proposal document
    pub proposal: String,
    /// Insertion order document
    pub pi: String,
    /// Price table
    pub price_table: String,
    /// Email thread export
    pub email_thread: String,
    /// Creative assets
    pub creative: String,
    /// Address list
    pub addresses: String,
    /// Click destination URLs
    pub destination_urls: Vec<String>,
}

/// The root campaign entity, one per active session.
///
/// Created empty (via [`Default`]) on first load or restored from local
/// storage, fully replaced after a successful extraction run, mutated in
/// place by user edits, and reset to empty on explicit user action. The
/// record exclusively owns everything nested inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    /// Client name
    pub client_name: String,
    /// Campaign name
    pub campaign_name: String,
    /// Human-chosen proposal identifier, carried across extraction runs
    pub proposal_file_name: String,
    /// Flight start date, free text as it appears in the documents
    pub start_date: String,
    /// Flight end date, free text
    pub end_date: String,
    /// Gross budget
    pub total_budget: f64,
    /// Net budget
    pub net_value: f64,
    /// Lifecycle status
    pub status: CampaignStatus,
    /// Campaign objective text
    pub objective: String,
    /// Marketing tactic text
    pub marketing_tactic: String,
    /// Extracted email interactions (flat timeline)
    pub emails: Vec<EmailInteraction>,
    /// Email interactions grouped by upload
    #[serde(default)]
    pub email_batches: Vec<EmailBatch>,
    /// Reviewer observations on the overview tab
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview_observations: Option<String>,
    /// Strategy lines extracted from the commercial proposal
    pub pm_proposal_strategies: Vec<StrategyItem>,
    /// Strategy lines extracted from the technical plan
    pub pm_opec_strategies: Vec<StrategyItem>,
    /// Reconciled audit table, always exactly nine rows after extraction
    pub audit: Vec<AuditItem>,
    /// Audience targeting
    pub targeting: Targeting,
    /// Legal terms
    pub legal: LegalTerms,
    /// Insertion-order entities
    pub pi_entities: PiEntities,
    /// Insertion-order specifics
    pub pi_specifics: PiSpecifics,
    /// Primary KPIs
    pub primary_kpis: Vec<String>,
    /// Secondary KPIs
    pub kpis: Vec<String>,
    /// Asset links
    pub links: AssetLinks,
    /// Imported performance report, when one was uploaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_report: Option<PerformanceReport>,
}

impl Default for CampaignRecord {
    fn default() -> Self {
        Self {
            client_name: "-".to_string(),
            campaign_name: "-".to_string(),
            proposal_file_name: String::new(),
            start_date: "-".to_string(),
            end_date: "-".to_string(),
            total_budget: 0.0,
            net_value: 0.0,
            status: CampaignStatus::Draft,
            objective: "-".to_string(),
            marketing_tactic: "-".to_string(),
            emails: Vec::new(),
            email_batches: Vec::new(),
            overview_observations: None,
            pm_proposal_strategies: Vec::new(),
            pm_opec_strategies: Vec::new(),
            audit: Vec::new(),
            targeting: Targeting::default(),
            legal: LegalTerms::default(),
            pi_entities: PiEntities::default(),
            pi_specifics: PiSpecifics::default(),
            primary_kpis: Vec::new(),
            kpis: Vec::new(),
            links: AssetLinks::default(),
            ai_report: None,
        }
    }
}

impl CampaignRecord {
    /// Sum of impression goals across both strategy lists.
    pub fn total_impression_goal(&self) -> f64 {
        self.pm_proposal_strategies
            .iter()
            .chain(self.pm_opec_strategies.iter())
            .map(|s| s.impression_goal)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_draft_and_empty() {
        let record = CampaignRecord::default();
        assert_eq!(record.status, CampaignStatus::Draft);
        assert_eq!(record.client_name, "-");
        assert_eq!(record.total_budget, 0.0);
        assert!(record.audit.is_empty());
        assert!(record.proposal_file_name.is_empty());
    }

    #[test]
    fn test_record_round_trip_is_exact() {
        let mut record = CampaignRecord::default();
        record.client_name = "Acme Varejo".to_string();
        record.status = CampaignStatus::Active;
        record.total_budget = 120_000.5;
        record.primary_kpis.push("CTR".to_string());

        let json = serde_json::to_string(&record).unwrap();
        let back: CampaignRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
        assert!(json.contains("\"clientName\":\"Acme Varejo\""));
        assert!(json.contains("\"pmOpecStrategies\""));
    }

    #[test]
    fn test_total_impression_goal_spans_both_lists() {
        use crate::strategy::{BidModel, StrategyItem, TechFeatures};
        let line = |id, goal| StrategyItem {
            id,
            platform: "DV360".to_string(),
            tactic: "Prospecting".to_string(),
            format: "Banner".to_string(),
            bid_model: BidModel::Cpm,
            bid_value: 10.0,
            total_cost: 1000.0,
            impression_goal: goal,
            tech_features: TechFeatures::default(),
        };
        let mut record = CampaignRecord::default();
        record.pm_proposal_strategies.push(line(1, 100_000.0));
        record.pm_opec_strategies.push(line(1, 50_000.0));
        assert_eq!(record.total_impression_goal(), 150_000.0);
    }
}
