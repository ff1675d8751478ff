//! Performance report extraction
//!
//! A delivery export (PDF or XLSX) is extracted against a briefing
//! context built from the current record, so the model can judge whether
//! the campaign goals were met. Two attempts only: the second reframes
//! the prompt exactly like the ladder does for invalid output, but quota
//! and availability failures surface immediately instead of backing off,
//! since the user is waiting on a single interactive upload.

use crate::campaign::CampaignExtractor;
use crate::cancel::RunToken;
use crate::coerce::{coerce_object, looks_like_report, Coerced};
use crate::error::ExtractorError;
use crate::json::parse_model_json;
use crate::prompt::{
    report_response_schema, SourceDocument, REPORT_SYSTEM_INSTRUCTION,
};
use crate::retry::{classify, FailureKind, JSON_ONLY_REMINDER, RETRY_TEMPERATURE};
use chrono::Utc;
use mediaudit_domain::{
    CampaignRecord, Creative, Demographics, GoalsCheck, PerformanceReport, PublisherMetric,
    ReportSummary,
};
use mediaudit_llm::{GenerateRequest, LlmError, Part};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

const REPORT_MAX_OUTPUT_TOKENS: u32 = 16_000;
const REPORT_ATTEMPTS: u32 = 2;

const BUSY_HINT: &str =
    "The AI is at its usage limit right now. Wait a moment and upload the report again.";
const DOWN_HINT: &str =
    "The AI service is temporarily unavailable. Try the report upload again shortly.";

/// The model's report payload, before provenance is attached.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawReport {
    summary: ReportSummary,
    publishers: Option<Vec<PublisherMetric>>,
    demographics: Option<Demographics>,
    creatives: Option<Vec<Creative>>,
    considerations: Option<Vec<String>>,
    goals_check: Option<GoalsCheck>,
}

impl CampaignExtractor {
    /// Extract a structured performance report from a delivery export,
    /// cross-checked against the campaign briefing.
    pub async fn extract_performance_report(
        &self,
        document: &SourceDocument,
        record: &CampaignRecord,
        run: &RunToken,
    ) -> Result<PerformanceReport, ExtractorError> {
        let credential = self
            .credentials()
            .first()
            .ok_or_else(|| ExtractorError::Configuration("No API credentials available".into()))?;
        let model = crate::campaign::DEFAULT_MODELS[0];

        let mime = if document.mime_type.is_empty() {
            "application/pdf"
        } else {
            &document.mime_type
        };
        let base_request = GenerateRequest::new(REPORT_SYSTEM_INSTRUCTION, "")
            .with_parts(vec![
                Part::text(briefing_context(record)),
                Part::inline_bytes(mime, &document.bytes),
            ])
            .with_response_schema(report_response_schema())
            .with_max_output_tokens(REPORT_MAX_OUTPUT_TOKENS);

        let mut last_error = String::new();
        for attempt in 1..=REPORT_ATTEMPTS {
            let request = if attempt == 1 {
                base_request.clone()
            } else {
                let mut adjusted = base_request.clone();
                adjusted.system_instruction.push_str(JSON_ONLY_REMINDER);
                adjusted.temperature = RETRY_TEMPERATURE;
                adjusted
            };

            let outcome = self.provider().generate(credential, model, &request).await;
            run.ensure_current()?;

            match outcome {
                Ok(text) => match parse_report_payload(&text) {
                    Ok(map) => {
                        let report = materialize_report(map, document)?;
                        info!(file = %document.file_name, attempt, "performance report extracted");
                        return Ok(report);
                    }
                    Err(err) => {
                        debug!(attempt, error = %err, "report payload unusable, reframing");
                        last_error = err.to_string();
                    }
                },
                Err(err) => match classify(&err) {
                    FailureKind::RateLimited => {
                        return Err(ExtractorError::Llm(BUSY_HINT.to_string()))
                    }
                    FailureKind::Unavailable => {
                        return Err(ExtractorError::Llm(DOWN_HINT.to_string()))
                    }
                    FailureKind::Permanent => {
                        return Err(ExtractorError::InvalidModel(model.to_string()))
                    }
                    _ => {
                        if let LlmError::Configuration(_) = err {
                            return Err(ExtractorError::from(err));
                        }
                        debug!(attempt, error = %err, "report attempt failed");
                        last_error = err.to_string();
                    }
                },
            }
        }

        Err(ExtractorError::MalformedResponse(last_error))
    }
}

fn parse_report_payload(text: &str) -> Result<Map<String, Value>, ExtractorError> {
    if text.trim().is_empty() {
        return Err(ExtractorError::MalformedResponse(
            "empty response from the model".to_string(),
        ));
    }
    let value = parse_model_json(text)?;
    match coerce_object(value, &looks_like_report) {
        Coerced::Found(map) => Ok(map),
        Coerced::NotFound => Err(ExtractorError::MalformedResponse(
            "response is not a report object".to_string(),
        )),
    }
}

fn materialize_report(
    map: Map<String, Value>,
    document: &SourceDocument,
) -> Result<PerformanceReport, ExtractorError> {
    let raw: RawReport = serde_json::from_value(Value::Object(map))
        .map_err(|e| ExtractorError::MalformedResponse(e.to_string()))?;
    Ok(PerformanceReport {
        generated_at: Utc::now().to_rfc3339(),
        source_file_name: document.file_name.clone(),
        source_file_type: if document.mime_type.is_empty() {
            "application/pdf".to_string()
        } else {
            document.mime_type.clone()
        },
        summary: raw.summary,
        publishers: raw.publishers,
        demographics: raw.demographics,
        creatives: raw.creatives,
        considerations: raw.considerations,
        goals_check: raw.goals_check,
    })
}

/// Condense the record into the few lines the model needs to judge the
/// report: goals, budget, the latest negotiation signals and the heavy
/// strategy lines.
pub fn briefing_context(record: &CampaignRecord) -> String {
    let mut lines = vec![
        "BRIEFING CONTEXT (use to evaluate goalsCheck):".to_string(),
        format!("Client: {} | Campaign: {}", record.client_name, record.campaign_name),
        format!("Flight: {} to {}", record.start_date, record.end_date),
        format!(
            "Gross budget: {:.2} | Net: {:.2} | Impression goal: {:.0}",
            record.total_budget,
            record.net_value,
            record.total_impression_goal()
        ),
        format!("Objective: {}", record.objective),
    ];

    let recent: Vec<&str> = record
        .emails
        .iter()
        .rev()
        .take(8)
        .map(|e| e.summary.as_str())
        .collect();
    if !recent.is_empty() {
        lines.push(format!("Recent emails: {}", recent.join(" | ")));
    }

    for (label, strategies) in [
        ("Proposal plan", &record.pm_proposal_strategies),
        ("Technical plan", &record.pm_opec_strategies),
    ] {
        let mut by_cost: Vec<_> = strategies.iter().collect();
        by_cost.sort_by(|a, b| {
            b.total_cost
                .partial_cmp(&a.total_cost)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let highlights: Vec<String> = by_cost
            .iter()
            .take(10)
            .map(|s| format!("{} / {} ({:.0} impr.)", s.platform, s.format, s.impression_goal))
            .collect();
        if !highlights.is_empty() {
            lines.push(format!("{label}: {}", highlights.join("; ")));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediaudit_domain::{BidModel, StrategyItem, TechFeatures};

    fn strategy(platform: &str, cost: f64) -> StrategyItem {
        StrategyItem {
            id: 1,
            platform: platform.to_string(),
            tactic: "Prospecting".to_string(),
            format: "Banner".to_string(),
            bid_model: BidModel::Cpm,
            bid_value: 12.0,
            total_cost: cost,
            impression_goal: 1000.0,
            tech_features: TechFeatures::default(),
        }
    }

    #[test]
    fn test_briefing_context_highlights_largest_lines_first() {
        let mut record = CampaignRecord::default();
        record.client_name = "Acme".to_string();
        record.pm_proposal_strategies.push(strategy("Meta", 100.0));
        record.pm_proposal_strategies.push(strategy("DV360", 900.0));

        let context = briefing_context(&record);
        let dv = context.find("DV360").unwrap();
        let meta = context.find("Meta").unwrap();
        assert!(dv < meta);
        assert!(context.contains("Acme"));
    }

    #[test]
    fn test_briefing_context_caps_recent_emails_at_eight() {
        use mediaudit_domain::{EmailInteraction, EmailKind};
        let mut record = CampaignRecord::default();
        for i in 1..=12 {
            record.emails.push(EmailInteraction {
                id: i,
                date: "-".to_string(),
                sender: "x".to_string(),
                summary: format!("email-{i}"),
                kind: EmailKind::Negotiation,
            });
        }
        let context = briefing_context(&record);
        assert!(context.contains("email-12"));
        assert!(context.contains("email-5"));
        assert!(!context.contains("email-4"));
    }

    #[test]
    fn test_parse_report_payload_unwraps_fenced_json() {
        let text = "```json\n{\"summary\": {\"impressions\": 1000, \"clicks\": 20, \"ctr\": 2.0}}\n```";
        let map = parse_report_payload(text).unwrap();
        assert!(map.contains_key("summary"));
    }

    #[test]
    fn test_materialize_report_attaches_provenance() {
        let map = parse_report_payload("{\"summary\": {\"ctr\": 1.5}}").unwrap();
        let doc = SourceDocument {
            kind: crate::prompt::DocumentKind::Proposal,
            file_name: "report.xlsx".to_string(),
            mime_type: "application/vnd.ms-excel".to_string(),
            bytes: Vec::new(),
        };
        let report = materialize_report(map, &doc).unwrap();
        assert_eq!(report.source_file_name, "report.xlsx");
        assert_eq!(report.summary.ctr, Some(1.5));
        assert!(!report.generated_at.is_empty());
    }
}
