//! Campaign record persistence over the local key-value state file.

use crate::error::Result;
use mediaudit_domain::{CampaignRecord, KeyValueStore};
use mediaudit_store::FileStore;
use tracing::warn;

/// Store key holding the serialized campaign record.
pub const RECORD_KEY: &str = "campaign_record";

/// Load the saved record, or an empty draft when none exists or the
/// saved one no longer parses.
pub fn load_record(store: &FileStore) -> Result<CampaignRecord> {
    match store.get(RECORD_KEY)? {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(record) => Ok(record),
            Err(e) => {
                warn!(error = %e, "saved campaign record no longer parses, starting fresh");
                Ok(CampaignRecord::default())
            }
        },
        None => Ok(CampaignRecord::default()),
    }
}

/// Persist the record.
pub fn save_record(store: &FileStore, record: &CampaignRecord) -> Result<()> {
    let raw = serde_json::to_string(record)?;
    store.set(RECORD_KEY, &raw)?;
    Ok(())
}

/// Discard the saved record, keeping rotation cursors and usage counts.
pub fn clear_record(store: &FileStore) -> Result<()> {
    store.remove(RECORD_KEY)?;
    Ok(())
}
