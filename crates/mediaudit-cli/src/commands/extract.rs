//! Extract command implementation.

use super::{read_document, require_credentials, rotated_credentials};
use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::state;
use mediaudit_extractor::{CampaignExtractor, CancelToken, DocumentKind};
use mediaudit_llm::{increment_daily_usage, GeminiProvider, Purpose};
use mediaudit_store::FileStore;
use std::sync::Arc;

/// Execute the extract command.
pub async fn execute_extract(args: ExtractArgs, config: &Config, store: &FileStore) -> Result<()> {
    let mut documents = Vec::new();
    for (path, kind) in [
        (&args.pi, DocumentKind::InsertionOrder),
        (&args.proposal, DocumentKind::Proposal),
        (&args.emails, DocumentKind::EmailThread),
        (&args.opec, DocumentKind::TechnicalPlan),
    ] {
        if let Some(path) = path {
            documents.push(read_document(path, kind)?);
        }
    }
    if documents.is_empty() {
        return Err(CliError::InvalidInput(
            "Pass at least one document: --pi, --proposal, --emails or --opec".to_string(),
        ));
    }

    let pool = config.credentials();
    require_credentials(&pool)?;
    let credentials = rotated_credentials(store, &pool, Purpose::BulkExtraction)?;

    let extractor = CampaignExtractor::new(
        Arc::new(GeminiProvider::new()),
        credentials,
        config.models(),
    );

    let mut current = state::load_record(store)?;
    if let Some(name) = args.proposal_name {
        current.proposal_file_name = name;
    }

    let cancel = CancelToken::new();
    let run = cancel.begin_run();
    let on_status = |line: &str| eprintln!("{line}");

    let record = extractor
        .extract_campaign(&documents, &current, Some(&on_status), &run)
        .await?;

    let calls_today = increment_daily_usage(store);
    state::save_record(store, &record)?;

    let inconsistent = record.audit.iter().filter(|a| !a.is_consistent).count();
    println!("Campaign: {} / {}", record.client_name, record.campaign_name);
    println!(
        "Strategies: {} proposal, {} technical | Emails: {}",
        record.pm_proposal_strategies.len(),
        record.pm_opec_strategies.len(),
        record.emails.len()
    );
    println!("Audit: {inconsistent} of {} fields inconsistent", record.audit.len());
    println!("AI calls today: {calls_today}");
    Ok(())
}
