//! Reset command implementation.

use crate::error::Result;
use crate::state;
use mediaudit_store::FileStore;

/// Execute the reset command.
pub async fn execute_reset(store: &FileStore) -> Result<()> {
    state::clear_record(store)?;
    println!("Campaign record discarded.");
    Ok(())
}
