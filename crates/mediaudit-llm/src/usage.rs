//! Daily call counter
//!
//! Keeps a `{date, count}` record in the key-value store so the UI can
//! show how many generation calls were made today. Persistence is
//! best-effort throughout; a broken store only costs the counter.

use chrono::Local;
use mediaudit_domain::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::warn;

const USAGE_KEY: &str = "gemini_usage_tracker";

#[derive(Debug, Serialize, Deserialize)]
struct UsageRecord {
    date: String,
    count: u32,
}

fn today_key() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

fn load_record<S: KeyValueStore>(store: &S) -> Option<UsageRecord> {
    let raw = store.get(USAGE_KEY).ok().flatten()?;
    serde_json::from_str(&raw).ok()
}

fn save_record<S: KeyValueStore>(store: &S, record: &UsageRecord) {
    match serde_json::to_string(record) {
        Ok(raw) => {
            if let Err(e) = store.set(USAGE_KEY, &raw) {
                warn!(error = %e, "failed to persist usage record");
            }
        }
        Err(e) => warn!(error = %e, "failed to serialize usage record"),
    }
}

fn load_for_day<S: KeyValueStore>(store: &S, day: &str) -> u32 {
    match load_record(store) {
        Some(record) if record.date == day => record.count,
        _ => {
            save_record(
                store,
                &UsageRecord {
                    date: day.to_string(),
                    count: 0,
                },
            );
            0
        }
    }
}

fn increment_for_day<S: KeyValueStore>(store: &S, day: &str) -> u32 {
    let base = match load_record(store) {
        Some(record) if record.date == day => record.count,
        _ => 0,
    };
    let next = base + 1;
    save_record(
        store,
        &UsageRecord {
            date: day.to_string(),
            count: next,
        },
    );
    next
}

/// Calls made today; resets (and persists the reset) on day change.
pub fn load_daily_usage<S: KeyValueStore>(store: &S) -> u32 {
    load_for_day(store, &today_key())
}

/// Record one more call today and return the new total.
pub fn increment_daily_usage<S: KeyValueStore>(store: &S) -> u32 {
    increment_for_day(store, &today_key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediaudit_store::MemoryStore;

    #[test]
    fn test_usage_starts_at_zero_and_increments() {
        let store = MemoryStore::new();
        assert_eq!(load_for_day(&store, "2025-03-01"), 0);
        assert_eq!(increment_for_day(&store, "2025-03-01"), 1);
        assert_eq!(increment_for_day(&store, "2025-03-01"), 2);
        assert_eq!(load_for_day(&store, "2025-03-01"), 2);
    }

    #[test]
    fn test_usage_resets_across_day_boundary() {
        let store = MemoryStore::new();
        increment_for_day(&store, "2025-03-01");
        increment_for_day(&store, "2025-03-01");

        assert_eq!(load_for_day(&store, "2025-03-02"), 0);
        assert_eq!(increment_for_day(&store, "2025-03-02"), 1);
    }

    #[test]
    fn test_corrupt_record_is_treated_as_missing() {
        let store = MemoryStore::new();
        store.set(USAGE_KEY, "{broken").unwrap();
        assert_eq!(load_for_day(&store, "2025-03-01"), 0);
        assert_eq!(increment_for_day(&store, "2025-03-01"), 1);
    }
}
