//! Per-purpose credential rotation
//!
//! Each call class keeps its own cursor in the key-value store so load
//! spreads across credentials over repeated calls of the same kind. A
//! corrupt cursor falls back to 0 and a failed cursor write is swallowed:
//! rotation still works within the session, it just restarts next time.

use crate::LlmError;
use mediaudit_domain::KeyValueStore;
use tracing::{debug, warn};

/// Call class a credential is being picked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// Full multi-document campaign extraction
    BulkExtraction,
    /// Performance report extraction
    ReportExtraction,
    /// Email thread update extraction
    EmailExtraction,
    /// Observation text refinement
    TextRefinement,
}

impl Purpose {
    /// Store key holding this purpose's rotation cursor.
    pub fn cursor_key(&self) -> &'static str {
        match self {
            Purpose::BulkExtraction => "gemini_key_index_process",
            Purpose::ReportExtraction => "gemini_key_index_report",
            Purpose::EmailExtraction => "gemini_key_index_email",
            Purpose::TextRefinement => "gemini_key_index_refine",
        }
    }
}

/// Pick the next credential for `purpose`, advancing the stored cursor.
///
/// Fails only when the pool is empty; storage trouble in either direction
/// degrades to cursor 0 or an unadvanced cursor, never an error.
pub fn pick_credential<S: KeyValueStore>(
    store: &S,
    pool: &[String],
    purpose: Purpose,
) -> Result<String, LlmError> {
    if pool.is_empty() {
        return Err(LlmError::Configuration(
            "No API credentials available".to_string(),
        ));
    }

    let key = purpose.cursor_key();
    let cursor = match store.get(key) {
        Ok(Some(raw)) => raw.trim().parse::<i64>().unwrap_or(0),
        Ok(None) => 0,
        Err(e) => {
            warn!(key, error = %e, "failed to read rotation cursor, using 0");
            0
        }
    };

    let len = pool.len() as i64;
    let index = (cursor.rem_euclid(len)) as usize;
    let next = (index + 1) % pool.len();

    if let Err(e) = store.set(key, &next.to_string()) {
        warn!(key, error = %e, "failed to persist rotation cursor");
    }

    debug!(?purpose, index, next, "picked credential");
    Ok(pool[index].clone())
}
