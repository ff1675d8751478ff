//! End-to-end tests of the extraction pipeline over a scripted provider

use mediaudit_domain::{AuditFieldKey, CampaignRecord, CampaignStatus, EmailKind};
use mediaudit_extractor::{
    CampaignExtractor, CancelToken, DocumentKind, ExtractorError, SourceDocument, StatusFn,
};
use mediaudit_llm::{LlmError, MockProvider};
use std::sync::{Arc, Mutex};

fn document(kind: DocumentKind, file_name: &str) -> SourceDocument {
    SourceDocument {
        kind,
        file_name: file_name.to_string(),
        mime_type: String::new(),
        bytes: vec![0u8; 16],
    }
}

fn extractor_with(provider: MockProvider, credentials: &[&str]) -> CampaignExtractor {
    CampaignExtractor::new(
        Arc::new(provider),
        credentials.iter().map(|c| c.to_string()).collect(),
        vec!["gemini-3-flash-preview".to_string()],
    )
}

fn campaign_json() -> String {
    r#"{
        "clientName": "Acme Varejo",
        "campaignName": "Inverno 2025",
        "startDate": "01/06/2025",
        "endDate": "30/06/2025",
        "totalBudget": 100000,
        "netValue": 80000,
        "emails": [
            {"id": 1, "date": "12/05", "sender": "ana@agencia.com",
             "summary": "Proposta inicial enviada", "type": "initial"}
        ],
        "audit": [
            {"id": 1, "field": "Investimento Bruto",
             "piValue": "R$ 100.000,00", "proposalValue": "R$ 95.000,00",
             "emailValue": "R$ 90.000,00", "pmValue": "R$ 85.000,00",
             "notes": "Valores divergem entre os documentos."}
        ]
    }"#
    .to_string()
}

#[tokio::test(start_paused = true)]
async fn rate_limits_are_waited_out_and_reported_truthfully() {
    let provider = MockProvider::new(campaign_json());
    provider.push_error(LlmError::RateLimited("quota exceeded".to_string()));
    provider.push_error(LlmError::RateLimited("quota exceeded".to_string()));

    let extractor = extractor_with(provider.clone(), &["key-a"]);
    let statuses: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&statuses);
    let on_status = move |line: &str| sink.lock().unwrap().push(line.to_string());
    let on_status: &StatusFn = &on_status;

    let cancel = CancelToken::new();
    let run = cancel.begin_run();
    let record = extractor
        .extract_campaign(
            &[document(DocumentKind::InsertionOrder, "pi.pdf")],
            &CampaignRecord::default(),
            Some(on_status),
            &run,
        )
        .await
        .unwrap();

    assert_eq!(record.client_name, "Acme Varejo");
    assert_eq!(provider.call_count(), 3);

    let lines = statuses.lock().unwrap();
    let rate_lines: Vec<&String> = lines.iter().filter(|l| l.contains("Rate limit")).collect();
    assert_eq!(rate_lines.len(), 2);
    assert!(rate_lines[0].contains("Attempt 1/5"));
    assert!(rate_lines[1].contains("Attempt 2/5"));
    assert!(lines.iter().any(|l| l.contains("Analyzing via gemini-3-flash-preview")));
}

#[tokio::test(start_paused = true)]
async fn invalid_model_aborts_the_whole_ladder_after_one_call() {
    let provider = MockProvider::new(campaign_json());
    provider.push_error(LlmError::ModelNotFound("gemini-3-flash-preview".to_string()));

    // Two credentials available, yet a bad model id must not burn the second
    let extractor = extractor_with(provider.clone(), &["key-a", "key-b"]);
    let cancel = CancelToken::new();
    let run = cancel.begin_run();
    let result = extractor
        .extract_campaign(
            &[document(DocumentKind::Proposal, "proposal.pdf")],
            &CampaignRecord::default(),
            None,
            &run,
        )
        .await;

    match result {
        Err(ExtractorError::InvalidModel(model)) => {
            assert_eq!(model, "gemini-3-flash-preview");
        }
        other => panic!("expected InvalidModel, got {other:?}"),
    }
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn implausible_output_exhausts_every_rung() {
    // "{}" parses but never looks like a campaign, so every rung burns
    // its invalid-output budget of two attempts
    let provider = MockProvider::new("{}");
    let extractor = extractor_with(provider.clone(), &["key-a", "key-b"]);
    let cancel = CancelToken::new();
    let run = cancel.begin_run();
    let result = extractor
        .extract_campaign(
            &[document(DocumentKind::Proposal, "proposal.pdf")],
            &CampaignRecord::default(),
            None,
            &run,
        )
        .await;

    assert!(matches!(result, Err(ExtractorError::Exhausted(_))));
    assert_eq!(provider.call_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn superseded_run_reports_stale_instead_of_a_result() {
    let provider = MockProvider::new(campaign_json());
    let extractor = extractor_with(provider, &["key-a"]);
    let cancel = CancelToken::new();
    let run = cancel.begin_run();
    cancel.cancel();

    let result = extractor
        .extract_campaign(
            &[document(DocumentKind::Proposal, "proposal.pdf")],
            &CampaignRecord::default(),
            None,
            &run,
        )
        .await;

    assert!(matches!(result, Err(ExtractorError::Stale)));
}

#[tokio::test(start_paused = true)]
async fn divergent_budget_reconciles_to_inconsistent_audit_row() {
    let provider = MockProvider::new(campaign_json());
    let extractor = extractor_with(provider, &["key-a"]);
    let cancel = CancelToken::new();
    let run = cancel.begin_run();
    let record = extractor
        .extract_campaign(
            &[
                document(DocumentKind::InsertionOrder, "pi.pdf"),
                document(DocumentKind::EmailThread, "thread.pdf"),
            ],
            &CampaignRecord::default(),
            None,
            &run,
        )
        .await
        .unwrap();

    assert_eq!(record.status, CampaignStatus::Active);
    assert_eq!(record.audit.len(), 9);

    let gross = record
        .audit
        .iter()
        .find(|item| item.field == AuditFieldKey::GrossBudget)
        .unwrap();
    assert_eq!(gross.id, 3);
    assert!(!gross.is_consistent);
    assert_eq!(gross.pi_value, "R$ 100.000,00");
    assert_eq!(gross.pm_value, "R$ 85.000,00");

    // The eight dimensions the model skipped degrade to placeholders
    let start = record
        .audit
        .iter()
        .find(|item| item.field == AuditFieldKey::StartDate)
        .unwrap();
    assert_eq!(start.pi_value, "-");
    assert!(!start.is_consistent);

    // The extracted timeline is grouped into the initial batch, named
    // after the uploaded thread export
    assert_eq!(record.emails.len(), 1);
    assert_eq!(record.emails[0].kind, EmailKind::Initial);
    assert_eq!(record.email_batches.len(), 1);
    assert_eq!(record.email_batches[0].file_name, "thread.pdf");
}

#[tokio::test(start_paused = true)]
async fn invalid_output_retry_reframes_the_prompt() {
    let provider = MockProvider::new(campaign_json());
    provider.push_outcome(Ok("the quick brown fox".to_string()));

    let extractor = extractor_with(provider.clone(), &["key-a"]);
    let cancel = CancelToken::new();
    let run = cancel.begin_run();
    let record = extractor
        .extract_campaign(
            &[document(DocumentKind::Proposal, "proposal.pdf")],
            &CampaignRecord::default(),
            None,
            &run,
        )
        .await
        .unwrap();
    assert_eq!(record.client_name, "Acme Varejo");

    let calls = provider.calls();
    assert_eq!(calls.len(), 2);
    assert!(!calls[0].system_instruction.contains("ONLY valid JSON"));
    assert!(calls[1].system_instruction.ends_with("ONLY valid JSON."));
    assert!((calls[0].temperature - 0.1).abs() < f32::EPSILON);
    assert!((calls[1].temperature - 0.2).abs() < f32::EPSILON);
}
