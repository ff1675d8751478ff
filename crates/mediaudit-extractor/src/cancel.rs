//! Run supersession tracking
//!
//! A generation counter shared between the UI flow and in-flight
//! extraction runs. Starting a new run or cancelling bumps the counter;
//! a run checks its snapshot after every suspension point so a stale
//! result is dropped instead of clobbering state the user already reset.

use crate::error::ExtractorError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared generation counter.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    generation: Arc<AtomicU64>,
}

impl CancelToken {
    /// New token at generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run, superseding any in-flight one.
    pub fn begin_run(&self) -> RunToken {
        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        RunToken {
            generation: Arc::clone(&self.generation),
            id,
        }
    }

    /// Supersede the current run without starting a new one.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Snapshot held by one run.
#[derive(Debug, Clone)]
pub struct RunToken {
    generation: Arc<AtomicU64>,
    id: u64,
}

impl RunToken {
    /// Whether a newer run has started since this snapshot.
    pub fn is_stale(&self) -> bool {
        self.generation.load(Ordering::SeqCst) != self.id
    }

    /// Fail with [`ExtractorError::Stale`] if superseded.
    pub fn ensure_current(&self) -> Result<(), ExtractorError> {
        if self.is_stale() {
            Err(ExtractorError::Stale)
        } else {
            Ok(())
        }
    }
}
