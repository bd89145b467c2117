//! Rule-based severity classification from a reporter hint and error text.
//!
//! Rules are checked from most to least severe and the first match wins, so
//! an error mentioning an outage is critical whatever the hint says.

use serde::Serialize;
use tracing::debug;

use crate::triage::{IncidentRecord, Severity};

const CRITICAL_MARKERS: &[&str] = &["pool exhausted", "outage", "down"];
const HIGH_MARKERS: &[&str] = &["timeout", "crash", "error"];
const MEDIUM_MARKERS: &[&str] = &["warning"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub severity: Severity,
}

/// Classify an incident. Both inputs are compared case-insensitively.
pub fn classify(hint: &str, error: &str) -> Severity {
    let hint = hint.to_lowercase();
    let error = error.to_lowercase();
    let mentions = |markers: &[&str]| markers.iter().any(|m| error.contains(m));

    if hint == "critical" || mentions(CRITICAL_MARKERS) {
        Severity::Critical
    } else if hint == "high" || mentions(HIGH_MARKERS) {
        Severity::High
    } else if hint == "medium" || mentions(MEDIUM_MARKERS) {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Classify a whole record. A missing hint counts as empty.
pub fn classify_record(record: &IncidentRecord) -> Classification {
    let hint = record.severity_hint.as_deref().unwrap_or("");
    Classification {
        severity: classify(hint, record.error()),
    }
}

/// Give a record without an explicit severity one derived from its hint.
///
/// Records that already carry a severity, or carry no hint, are left alone.
/// Returns the severity that was filled in, if any.
pub fn fill_missing_severity(record: &mut IncidentRecord) -> Option<Severity> {
    if record.severity.is_some() {
        return None;
    }
    let hint = record.severity_hint.as_deref()?;
    let severity = classify(hint, record.error());
    debug!(%hint, %severity, "severity derived from hint");
    record.severity = Some(severity.as_str().to_string());
    Some(severity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_alone_sets_level() {
        assert_eq!(classify("critical", ""), Severity::Critical);
        assert_eq!(classify("HIGH", ""), Severity::High);
        assert_eq!(classify("Medium", ""), Severity::Medium);
        assert_eq!(classify("low", ""), Severity::Low);
        assert_eq!(classify("whatever", ""), Severity::Low);
    }

    #[test]
    fn test_error_markers() {
        assert_eq!(classify("", "DB pool exhausted"), Severity::Critical);
        assert_eq!(classify("", "regional outage"), Severity::Critical);
        assert_eq!(classify("", "service is Down"), Severity::Critical);
        assert_eq!(classify("", "read timeout"), Severity::High);
        assert_eq!(classify("", "worker crash loop"), Severity::High);
        assert_eq!(classify("", "internal error"), Severity::High);
        assert_eq!(classify("", "disk warning"), Severity::Medium);
        assert_eq!(classify("", "slow render"), Severity::Low);
    }

    #[test]
    fn test_error_outranks_lower_hint() {
        assert_eq!(classify("low", "payments down"), Severity::Critical);
        assert_eq!(classify("medium", "gateway timeout"), Severity::High);
    }

    #[test]
    fn test_hint_outranks_milder_error() {
        assert_eq!(classify("critical", "disk warning"), Severity::Critical);
        assert_eq!(classify("high", "slow render"), Severity::High);
    }

    #[test]
    fn test_classify_record_without_hint() {
        let record = IncidentRecord {
            error: Some("connection pool exhausted".to_string()),
            ..Default::default()
        };
        assert_eq!(classify_record(&record).severity, Severity::Critical);
    }

    #[test]
    fn test_fill_missing_severity_uses_hint() {
        let mut record = IncidentRecord {
            service: Some("auth".to_string()),
            error: Some("slow login".to_string()),
            severity_hint: Some("high".to_string()),
            ..Default::default()
        };
        assert_eq!(fill_missing_severity(&mut record), Some(Severity::High));
        assert_eq!(record.severity_label(), "high");
    }

    #[test]
    fn test_fill_missing_severity_keeps_explicit_value() {
        let mut record = IncidentRecord::new("auth", "down", "low");
        record.severity_hint = Some("critical".to_string());
        assert_eq!(fill_missing_severity(&mut record), None);
        assert_eq!(record.severity_label(), "low");
    }

    #[test]
    fn test_fill_missing_severity_without_hint() {
        let mut record = IncidentRecord::default();
        assert_eq!(fill_missing_severity(&mut record), None);
        assert_eq!(record.severity_label(), "low");
    }
}
