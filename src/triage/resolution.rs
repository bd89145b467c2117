//! Resolution-time estimation.

use serde::Serialize;

use crate::config::ResolutionTables;
use crate::triage::risk::contains_any;
use crate::triage::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolutionEstimate {
    pub base_minutes: u32,
    /// 1.0 unless the error text names a complexity keyword.
    pub multiplier: f64,
    /// `base_minutes * multiplier`, truncated toward zero.
    pub minutes: u32,
}

pub fn estimate(
    tables: &ResolutionTables,
    severity: Option<Severity>,
    error: &str,
) -> ResolutionEstimate {
    let base_minutes = tables.base_minutes.minutes(severity);
    let multiplier = if contains_any(error, &tables.complexity_keywords) {
        tables.complexity_multiplier
    } else {
        1.0
    };
    let minutes = (f64::from(base_minutes) * multiplier).trunc() as u32;

    ResolutionEstimate {
        base_minutes,
        multiplier,
        minutes,
    }
}
