//! incident-triage -- Risk scoring and triage recommendations for operational incidents.
//!
//! This crate provides the scoring engine used as one step of an incident
//! pipeline: risk scoring, resolution-time estimation, similar-incident lookup,
//! and the resulting escalate / remediate recommendation.

pub mod classify;
pub mod config;
pub mod io;
pub mod triage;

pub use config::ScoringConfig;
pub use triage::{
    evaluate, AnalysisResult, Evaluator, IncidentRecord, Recommendation, Severity,
};
