//! Mediaudit Extraction Pipeline
//!
//! The orchestration layer between uploaded campaign documents and the
//! structured [`CampaignRecord`](mediaudit_domain::CampaignRecord).
//!
//! # Architecture
//!
//! A run flows through four defensive layers, each assuming the one
//! before it lied:
//!
//! 1. [`retry`] walks a credential x model ladder with classification-
//!    driven backoff, one attempt in flight at a time
//! 2. [`json`] recovers a JSON value from whatever text the model
//!    produced, fences and prose included
//! 3. [`coerce`] finds the domain object inside that value, whether the
//!    model answered with it directly, wrapped it, or listed it
//! 4. [`audit`] reconciles the audit table to exactly nine canonical
//!    rows, degrading to placeholders rather than failing
//!
//! [`campaign`] ties the layers together for the bulk extraction;
//! [`emails`], [`report`] and [`refine`] are the lighter single-call
//! flows. [`cancel`] lets a superseded run die silently instead of
//! clobbering newer state.

#![warn(missing_docs)]

pub mod audit;
pub mod campaign;
pub mod cancel;
pub mod coerce;
pub mod emails;
pub mod error;
pub mod json;
pub mod prompt;
pub mod refine;
pub mod report;
pub mod retry;

pub use audit::reconcile_audit;
pub use campaign::{CampaignExtractor, DEFAULT_MODELS};
pub use cancel::{CancelToken, RunToken};
pub use coerce::{coerce_object, looks_like_campaign, looks_like_report, Coerced};
pub use error::ExtractorError;
pub use json::parse_model_json;
pub use prompt::{DocumentKind, SourceDocument};
pub use retry::{classify, FailureKind, RetryPolicy, StatusFn};
