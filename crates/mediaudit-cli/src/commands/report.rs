//! Report command implementation.

use super::{read_document, require_credentials, rotated_credentials};
use crate::cli::ReportArgs;
use crate::config::Config;
use crate::error::Result;
use crate::state;
use mediaudit_domain::GoalStatus;
use mediaudit_extractor::{CampaignExtractor, CancelToken, DocumentKind};
use mediaudit_llm::{increment_daily_usage, GeminiProvider, Purpose};
use mediaudit_store::FileStore;
use std::sync::Arc;

/// Execute the report command.
pub async fn execute_report(args: ReportArgs, config: &Config, store: &FileStore) -> Result<()> {
    let document = read_document(&args.file, DocumentKind::Proposal)?;

    let pool = config.credentials();
    require_credentials(&pool)?;
    let credentials = rotated_credentials(store, &pool, Purpose::ReportExtraction)?;

    let extractor = CampaignExtractor::new(
        Arc::new(GeminiProvider::new()),
        credentials,
        config.models(),
    );

    let mut record = state::load_record(store)?;
    let cancel = CancelToken::new();
    let run = cancel.begin_run();

    let report = extractor
        .extract_performance_report(&document, &record, &run)
        .await?;

    increment_daily_usage(store);

    println!("Report from {}", report.source_file_name);
    if let Some(impressions) = report.summary.impressions {
        println!("Impressions: {impressions:.0}");
    }
    if let Some(ctr) = report.summary.ctr {
        println!("CTR: {ctr:.2}%");
    }
    if let Some(goals) = &report.goals_check {
        let status = match goals.overall_status {
            GoalStatus::Hit => "goals met",
            GoalStatus::Partial => "goals partially met",
            GoalStatus::Miss => "goals missed",
            GoalStatus::Unknown => "goal status unknown",
        };
        println!("Goals: {status} ({} checks)", goals.items.len());
    }

    record.ai_report = Some(report);
    state::save_record(store, &record)?;
    Ok(())
}
