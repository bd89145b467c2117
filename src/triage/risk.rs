//! Business-impact risk scoring.
//!
//! The score is a sum of independent factors, each either contributing its
//! configured weight or nothing, clamped to `[0, 1]`.

use serde::Serialize;

use crate::config::RiskTables;
use crate::triage::{Recommendation, Severity};

pub const MAX_RISK_SCORE: f64 = 1.0;

/// Individual factor contributions before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskFactors {
    pub critical_service: f64,
    pub error_keyword: f64,
    pub severity: f64,
}

impl RiskFactors {
    /// Unclamped sum, accumulated in factor order.
    pub fn total(&self) -> f64 {
        let mut score = 0.0;
        score += self.critical_service;
        score += self.error_keyword;
        score += self.severity;
        score
    }

    /// Sum clamped to `[0, MAX_RISK_SCORE]`.
    pub fn score(&self) -> f64 {
        clamp_unit(self.total())
    }
}

/// Clamp to `[0, 1]`; NaN maps to 0.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, MAX_RISK_SCORE)
}

pub fn assess(
    tables: &RiskTables,
    service: &str,
    error: &str,
    severity: Option<Severity>,
) -> RiskFactors {
    let critical_service = if tables.critical_services.iter().any(|s| s == service) {
        tables.critical_service_weight
    } else {
        0.0
    };

    let error_keyword = if contains_any(error, &tables.error_keywords) {
        tables.error_keyword_weight
    } else {
        0.0
    };

    RiskFactors {
        critical_service,
        error_keyword,
        severity: tables.severity_weights.weight(severity),
    }
}

pub fn score(tables: &RiskTables, service: &str, error: &str, severity: Option<Severity>) -> f64 {
    assess(tables, service, error, severity).score()
}

/// Escalate only when the score is strictly above the threshold.
pub fn recommend(risk_score: f64, escalation_threshold: f64) -> Recommendation {
    if risk_score > escalation_threshold {
        Recommendation::Escalate
    } else {
        Recommendation::AttemptRemediation
    }
}

/// Case-insensitive substring search of `text` for any of `keywords`.
pub(crate) fn contains_any(text: &str, keywords: &[String]) -> bool {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .any(|k| haystack.contains(k.to_lowercase().as_str()))
}
