//! Command implementations.

mod emails;
mod extract;
mod refine;
mod report;
mod reset;
mod show;

pub use emails::execute_emails;
pub use extract::execute_extract;
pub use refine::execute_refine;
pub use report::execute_report;
pub use reset::execute_reset;
pub use show::execute_show;

use crate::error::{CliError, Result};
use mediaudit_extractor::{DocumentKind, SourceDocument};
use mediaudit_llm::{pick_credential, Purpose};
use mediaudit_store::FileStore;
use std::fs;
use std::path::Path;

/// Read a document file into a labeled source document, guessing the
/// mime type from the extension.
pub(crate) fn read_document(path: &Path, kind: DocumentKind) -> Result<SourceDocument> {
    let bytes = fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SourceDocument {
        kind,
        file_name,
        mime_type: mime_for(path).to_string(),
        bytes,
    })
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => "text/csv",
        "txt" => "text/plain",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/pdf",
    }
}

/// Order the credential pool so the rotated pick for `purpose` comes
/// first, preserving cyclic order for the ladder's fallbacks.
pub(crate) fn rotated_credentials(
    store: &FileStore,
    pool: &[String],
    purpose: Purpose,
) -> Result<Vec<String>> {
    let first =
        pick_credential(store, pool, purpose).map_err(|e| CliError::Config(e.to_string()))?;
    let start = pool.iter().position(|k| *k == first).unwrap_or(0);
    Ok(pool
        .iter()
        .cycle()
        .skip(start)
        .take(pool.len())
        .cloned()
        .collect())
}

pub(crate) fn require_credentials(pool: &[String]) -> Result<()> {
    if pool.is_empty() {
        return Err(CliError::Config(
            "No API credentials. Set GEMINI_API_KEY or add api_keys to the config file."
                .to_string(),
        ));
    }
    Ok(())
}
