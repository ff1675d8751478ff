//! Mediaudit Domain Layer
//!
//! This crate contains the core data model for the campaign audit pipeline.
//! It defines the campaign record and every entity nested inside it, the
//! fixed set of canonical audit dimensions, and the trait interface for the
//! local key-value store that other layers implement.
//!
//! ## Key Concepts
//!
//! - **CampaignRecord**: The root entity - one per active session, fully
//!   replaced after a successful extraction run
//! - **AuditItem**: One row per canonical audit dimension (exactly 9,
//!   ids 1..9, fixed order) comparing values observed across four source
//!   documents
//! - **StrategyItem**: One media-plan line item; two independent lists
//!   exist (proposal-sourced vs. technical-plan-sourced), never merged
//! - **EmailInteraction / EmailBatch**: Extracted thread messages grouped
//!   by upload so incremental updates do not discard prior extractions
//!
//! ## Architecture
//!
//! The record serializes as camelCase JSON; the export/import round trip
//! must be exact because the record is embedded verbatim in generated
//! reports and re-imported later. Infrastructure implementations of the
//! [`KeyValueStore`] trait live in other crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audit;
pub mod campaign;
pub mod email;
pub mod report;
pub mod strategy;
pub mod traits;

// Re-exports for convenience
pub use audit::{AuditFieldKey, AuditItem, AUDIT_FIELD_KEYS};
pub use campaign::{
    AssetLinks, CampaignRecord, CampaignStatus, LegalTerms, PiEntities, PiSpecifics, Targeting,
};
pub use email::{EmailBatch, EmailInteraction, EmailKind};
pub use report::{
    BreakdownItem, Creative, Demographics, GoalCheckItem, GoalStatus, GoalsCheck,
    PerformanceReport, PublisherMetric, ReportSummary,
};
pub use strategy::{BidModel, StrategyItem, TechFeatures};
pub use traits::KeyValueStore;
