//! Emails command implementation.

use super::{read_document, require_credentials, rotated_credentials};
use crate::cli::EmailsArgs;
use crate::config::Config;
use crate::error::Result;
use crate::state;
use mediaudit_extractor::{CampaignExtractor, CancelToken, DocumentKind};
use mediaudit_llm::{increment_daily_usage, GeminiProvider, Purpose};
use mediaudit_store::FileStore;
use std::sync::Arc;

/// Execute the emails command.
pub async fn execute_emails(args: EmailsArgs, config: &Config, store: &FileStore) -> Result<()> {
    let document = read_document(&args.file, DocumentKind::EmailThread)?;

    let pool = config.credentials();
    require_credentials(&pool)?;
    let credentials = rotated_credentials(store, &pool, Purpose::EmailExtraction)?;

    let extractor = CampaignExtractor::new(
        Arc::new(GeminiProvider::new()),
        credentials,
        config.models(),
    );

    let mut record = state::load_record(store)?;
    let cancel = CancelToken::new();
    let run = cancel.begin_run();

    let count = extractor
        .extract_email_updates(&document, &mut record, &run)
        .await?;

    increment_daily_usage(store);
    state::save_record(store, &record)?;

    println!("Appended {count} emails from {}", document.file_name);
    println!(
        "Timeline now holds {} emails across {} batches",
        record.emails.len(),
        record.email_batches.len()
    );
    Ok(())
}
