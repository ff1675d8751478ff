//! Bulk campaign extraction orchestrator
//!
//! Runs the multi-document extraction through the retry ladder, then
//! assembles the untrusted model output into a [`CampaignRecord`]. The
//! assembly is deliberately lenient: every field is coerced
//! independently, so one malformed strategy row or a missing section
//! never discards the rest of an otherwise good extraction.

use crate::audit::reconcile_audit;
use crate::cancel::RunToken;
use crate::coerce::looks_like_campaign;
use crate::error::ExtractorError;
use crate::prompt::{
    campaign_parts, campaign_response_schema, DocumentKind, SourceDocument,
    CAMPAIGN_SYSTEM_INSTRUCTION,
};
use crate::retry::{run_ladder, RetryPolicy, StatusFn};
use chrono::Utc;
use mediaudit_domain::{
    AssetLinks, BidModel, CampaignRecord, CampaignStatus, EmailBatch, EmailInteraction, EmailKind,
    LegalTerms, PiEntities, PiSpecifics, StrategyItem, Targeting, TechFeatures,
};
use mediaudit_llm::{GenerateRequest, GenerativeModel};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

/// Model ladder used when the configuration does not name one.
pub const DEFAULT_MODELS: &[&str] = &["gemini-3-flash-preview"];

/// Output cap for the bulk extraction; strategy tables can be long.
const CAMPAIGN_MAX_OUTPUT_TOKENS: u32 = 65_000;

/// Drives the document-to-record extraction flows.
pub struct CampaignExtractor {
    provider: Arc<dyn GenerativeModel>,
    credentials: Vec<String>,
    models: Vec<String>,
    policy: RetryPolicy,
}

impl CampaignExtractor {
    /// Extractor over `provider` with the credential pool and model
    /// ladder to walk, in order.
    pub fn new(
        provider: Arc<dyn GenerativeModel>,
        credentials: Vec<String>,
        models: Vec<String>,
    ) -> Self {
        Self {
            provider,
            credentials,
            models,
            policy: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy (used by tests to shorten delays).
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub(crate) fn provider(&self) -> &dyn GenerativeModel {
        self.provider.as_ref()
    }

    pub(crate) fn credentials(&self) -> &[String] {
        &self.credentials
    }

    pub(crate) fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run the bulk extraction over the uploaded documents and build a
    /// fresh campaign record from the result.
    ///
    /// The returned record replaces the current one wholesale; only the
    /// human-chosen proposal file name is carried over from `current`.
    pub async fn extract_campaign(
        &self,
        documents: &[SourceDocument],
        current: &CampaignRecord,
        on_status: Option<&StatusFn>,
        run: &RunToken,
    ) -> Result<CampaignRecord, ExtractorError> {
        if documents.is_empty() {
            return Err(ExtractorError::Configuration(
                "No documents to analyze".to_string(),
            ));
        }

        let request = GenerateRequest::new(CAMPAIGN_SYSTEM_INSTRUCTION, "")
            .with_parts(campaign_parts(documents))
            .with_response_schema(campaign_response_schema())
            .with_max_output_tokens(CAMPAIGN_MAX_OUTPUT_TOKENS);

        let raw = run_ladder(
            self.provider.as_ref(),
            &self.credentials,
            &self.models,
            &request,
            &looks_like_campaign,
            &self.policy,
            on_status,
            run,
        )
        .await?;

        let email_file = documents
            .iter()
            .find(|d| d.kind == DocumentKind::EmailThread)
            .map(|d| d.file_name.as_str());
        let record = assemble_record(&raw, current, email_file);
        info!(
            client = %record.client_name,
            strategies = record.pm_proposal_strategies.len() + record.pm_opec_strategies.len(),
            emails = record.emails.len(),
            "campaign extraction assembled"
        );
        Ok(record)
    }
}

/// Read a string-ish value; numbers are rendered, everything else
/// falls back.
fn lenient_string(value: Option<&Value>, fallback: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => fallback.to_string(),
    }
}

/// Read a number, accepting Brazilian-formatted currency strings such
/// as `"R$ 123.456,78"`.
fn lenient_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_currency(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn parse_currency(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');
    let normalized = match (last_comma, last_dot) {
        // "123.456,78": dot is a thousands separator, comma is decimal
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        // "123,456.78": comma is a thousands separator
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };
    normalized.parse().ok()
}

fn lenient_bool(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

fn lenient_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn section<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    raw.get(key).and_then(Value::as_object)
}

/// Keep an email only when it carries content; ids are reassigned so
/// the timeline is always densely numbered from 1.
pub(crate) fn sanitize_emails(value: Option<&Value>) -> Vec<EmailInteraction> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|obj| {
            let sender = lenient_string(obj.get("sender"), "-");
            let summary = lenient_string(obj.get("summary"), "-");
            if sender == "-" && summary == "-" {
                return None;
            }
            let kind = match obj.get("type").and_then(Value::as_str) {
                Some("initial") => EmailKind::Initial,
                Some("approval") => EmailKind::Approval,
                _ => EmailKind::Negotiation,
            };
            Some(EmailInteraction {
                id: 0,
                date: lenient_string(obj.get("date"), "-"),
                sender,
                summary,
                kind,
            })
        })
        .enumerate()
        .map(|(idx, mut email)| {
            email.id = idx as u32 + 1;
            email
        })
        .collect()
}

/// Parse one strategy row field by field; an unknown bid model falls
/// back to CPM rather than discarding the row.
fn sanitize_strategies(value: Option<&Value>) -> Vec<StrategyItem> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .enumerate()
        .map(|(idx, obj)| {
            let bid_model = match obj.get("bidModel").and_then(Value::as_str) {
                Some("CPC") => BidModel::Cpc,
                Some("CPV") => BidModel::Cpv,
                _ => BidModel::Cpm,
            };
            let features = section_tech_features(obj.get("techFeatures"));
            StrategyItem {
                id: idx as u32 + 1,
                platform: lenient_string(obj.get("platform"), "-"),
                tactic: lenient_string(obj.get("tactic"), "-"),
                format: lenient_string(obj.get("format"), "-"),
                bid_model,
                bid_value: lenient_number(obj.get("bidValue")),
                total_cost: lenient_number(obj.get("totalCost")),
                impression_goal: lenient_number(obj.get("impressionGoal")),
                tech_features: features,
            }
        })
        .collect()
}

fn section_tech_features(value: Option<&Value>) -> TechFeatures {
    let Some(Value::Object(obj)) = value else {
        return TechFeatures::default();
    };
    TechFeatures {
        has_first_party: lenient_bool(obj.get("hasFirstParty")),
        has_footfall: lenient_bool(obj.get("hasFootfall")),
        is_rich_media: lenient_bool(obj.get("isRichMedia")),
        is_cross_device: lenient_bool(obj.get("isCrossDevice")),
    }
}

/// Assemble a fresh record from the coerced model output, field by field
/// over the empty-record defaults.
pub fn assemble_record(
    raw: &Map<String, Value>,
    current: &CampaignRecord,
    email_file_name: Option<&str>,
) -> CampaignRecord {
    let defaults = CampaignRecord::default();

    let targeting = match section(raw, "targeting") {
        Some(t) => Targeting {
            geo: lenient_string_list(t.get("geo")),
            demographics: lenient_string_list(t.get("demographics")),
            interests: lenient_string_list(t.get("interests")),
            devices: lenient_string_list(t.get("devices")),
            brand_safety: lenient_string(t.get("brandSafety"), "-"),
        },
        None => defaults.targeting.clone(),
    };

    let legal = match section(raw, "legal") {
        Some(l) => LegalTerms {
            payment_terms: lenient_string(l.get("paymentTerms"), "-"),
            agency_commission: lenient_string(l.get("agencyCommission"), "-"),
            cancellation_policy: lenient_string(l.get("cancellationPolicy"), "-"),
            penalty: lenient_string(l.get("penalty"), "-"),
        },
        None => defaults.legal.clone(),
    };

    let pi_entities = match section(raw, "piEntities") {
        Some(p) => PiEntities {
            razao_social: lenient_string(p.get("razaoSocial"), "-"),
            vehicle: lenient_string(p.get("vehicle"), "-"),
        },
        None => defaults.pi_entities.clone(),
    };

    let pi_specifics = match section(raw, "piSpecifics") {
        Some(p) => PiSpecifics {
            description: lenient_string(p.get("description"), "-"),
            considerations: lenient_string(p.get("considerations"), "-"),
        },
        None => defaults.pi_specifics.clone(),
    };

    let links = match section(raw, "links") {
        Some(l) => AssetLinks {
            proposal: lenient_string(l.get("proposal"), ""),
            pi: lenient_string(l.get("pi"), ""),
            price_table: lenient_string(l.get("priceTable"), ""),
            email_thread: lenient_string(l.get("emailThread"), ""),
            creative: lenient_string(l.get("creative"), ""),
            addresses: lenient_string(l.get("addresses"), ""),
            destination_urls: lenient_string_list(l.get("destinationUrls")),
        },
        None => defaults.links.clone(),
    };

    let mut record = CampaignRecord {
        client_name: lenient_string(raw.get("clientName"), "-"),
        campaign_name: lenient_string(raw.get("campaignName"), "-"),
        proposal_file_name: current.proposal_file_name.clone(),
        start_date: lenient_string(raw.get("startDate"), "-"),
        end_date: lenient_string(raw.get("endDate"), "-"),
        total_budget: lenient_number(raw.get("totalBudget")),
        net_value: lenient_number(raw.get("netValue")),
        status: CampaignStatus::Active,
        objective: lenient_string(raw.get("objective"), "-"),
        marketing_tactic: lenient_string(raw.get("marketingTactic"), "-"),
        emails: sanitize_emails(raw.get("emails")),
        email_batches: Vec::new(),
        overview_observations: None,
        pm_proposal_strategies: sanitize_strategies(raw.get("pmProposalStrategies")),
        pm_opec_strategies: sanitize_strategies(raw.get("pmOpecStrategies")),
        audit: reconcile_audit(raw.get("audit")),
        targeting,
        legal,
        pi_entities,
        pi_specifics,
        primary_kpis: lenient_string_list(raw.get("primaryKpis")),
        kpis: lenient_string_list(raw.get("kpis")),
        links,
        ai_report: None,
    };

    normalize_initial_email_batch(&mut record, email_file_name);
    record
}

/// Group the flat extracted timeline into a first upload batch, so
/// later thread updates append alongside it.
pub fn normalize_initial_email_batch(record: &mut CampaignRecord, file_name: Option<&str>) {
    if !record.email_batches.is_empty() || record.emails.is_empty() {
        return;
    }
    record.email_batches.push(EmailBatch {
        id: format!("batch_{}", Utc::now().timestamp_millis()),
        file_name: file_name.unwrap_or("Initial thread").to_string(),
        uploaded_at: Utc::now().to_rfc3339(),
        emails: record.emails.clone(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_parse_currency_brazilian_format() {
        assert_eq!(parse_currency("R$ 123.456,78"), Some(123456.78));
        assert_eq!(parse_currency("1.234,50"), Some(1234.5));
        assert_eq!(parse_currency("1,234.50"), Some(1234.5));
        assert_eq!(parse_currency("98765"), Some(98765.0));
        assert_eq!(parse_currency("indefinido"), None);
    }

    #[test]
    fn test_assemble_record_fills_missing_fields_with_defaults() {
        let raw = as_map(json!({
            "clientName": "Acme",
            "totalBudget": "R$ 10.000,00"
        }));
        let record = assemble_record(&raw, &CampaignRecord::default(), None);

        assert_eq!(record.client_name, "Acme");
        assert_eq!(record.total_budget, 10_000.0);
        assert_eq!(record.campaign_name, "-");
        assert_eq!(record.targeting.brand_safety, "-");
        assert_eq!(record.status, CampaignStatus::Active);
        // Reconciliation always yields the full nine-row table
        assert_eq!(record.audit.len(), 9);
    }

    #[test]
    fn test_assemble_record_carries_proposal_file_name() {
        let mut current = CampaignRecord::default();
        current.proposal_file_name = "PROP-2024-017".to_string();
        let record = assemble_record(&as_map(json!({})), &current, None);
        assert_eq!(record.proposal_file_name, "PROP-2024-017");
    }

    #[test]
    fn test_sanitize_strategies_defaults_bad_bid_model_to_cpm() {
        let raw = json!([
            {"id": 99, "platform": "DV360", "bidModel": "CPA", "bidValue": "2,50"},
            {"platform": "Meta", "bidModel": "CPC"}
        ]);
        let strategies = sanitize_strategies(Some(&raw));

        assert_eq!(strategies.len(), 2);
        assert_eq!(strategies[0].id, 1);
        assert_eq!(strategies[0].bid_model, BidModel::Cpm);
        assert_eq!(strategies[0].bid_value, 2.5);
        assert_eq!(strategies[1].id, 2);
        assert_eq!(strategies[1].bid_model, BidModel::Cpc);
        assert_eq!(strategies[1].tactic, "-");
    }

    #[test]
    fn test_sanitize_emails_drops_empty_and_renumbers() {
        let raw = json!([
            {"id": 7, "date": "01/03", "sender": "ana@agencia.com", "summary": "Proposta", "type": "initial"},
            {"id": 8, "sender": "-", "summary": "-"},
            {"date": "05/03", "sender": "comercial@veiculo.com", "summary": "Aprovado", "type": "signoff"}
        ]);
        let emails = sanitize_emails(Some(&raw));

        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].id, 1);
        assert_eq!(emails[0].kind, EmailKind::Initial);
        assert_eq!(emails[1].id, 2);
        // Unknown type degrades to negotiation
        assert_eq!(emails[1].kind, EmailKind::Negotiation);
    }

    #[test]
    fn test_initial_email_batch_created_once() {
        let raw = as_map(json!({
            "emails": [
                {"date": "01/03", "sender": "ana@agencia.com", "summary": "Kickoff", "type": "initial"}
            ]
        }));
        let record = assemble_record(&raw, &CampaignRecord::default(), Some("thread.pdf"));

        assert_eq!(record.email_batches.len(), 1);
        assert_eq!(record.email_batches[0].file_name, "thread.pdf");
        assert!(record.email_batches[0].id.starts_with("batch_"));
        assert_eq!(record.email_batches[0].emails.len(), 1);

        let mut again = record.clone();
        normalize_initial_email_batch(&mut again, None);
        assert_eq!(again.email_batches.len(), 1);
    }

    #[test]
    fn test_no_batch_for_empty_timeline() {
        let record = assemble_record(&as_map(json!({})), &CampaignRecord::default(), None);
        assert!(record.email_batches.is_empty());
    }
}
