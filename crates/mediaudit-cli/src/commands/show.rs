//! Show command implementation.

use crate::error::Result;
use crate::state;
use mediaudit_llm::load_daily_usage;
use mediaudit_store::FileStore;

/// Execute the show command.
pub async fn execute_show(store: &FileStore) -> Result<()> {
    let record = state::load_record(store)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    eprintln!("AI calls today: {}", load_daily_usage(store));
    Ok(())
}
