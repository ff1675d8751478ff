//! Refine command implementation.

use super::{require_credentials, rotated_credentials};
use crate::cli::RefineArgs;
use crate::config::Config;
use crate::error::Result;
use mediaudit_extractor::CampaignExtractor;
use mediaudit_llm::{GeminiProvider, Purpose};
use mediaudit_store::FileStore;
use std::sync::Arc;

/// Execute the refine command.
pub async fn execute_refine(args: RefineArgs, config: &Config, store: &FileStore) -> Result<()> {
    let pool = config.credentials();
    require_credentials(&pool)?;
    let credentials = rotated_credentials(store, &pool, Purpose::TextRefinement)?;

    let extractor = CampaignExtractor::new(
        Arc::new(GeminiProvider::new()),
        credentials,
        config.models(),
    );

    let refined = extractor.refine_text(&args.text, &args.context).await;
    println!("{refined}");
    Ok(())
}
