//! Incident risk evaluation: scoring, resolution estimates, similarity lookup.

pub mod clock;
pub mod evaluator;
pub mod resolution;
pub mod risk;
pub mod similarity;

pub use clock::{Clock, FixedClock, SystemClock};
pub use evaluator::{evaluate, Evaluator, Explained, RiskBreakdown};
pub use similarity::{SimilarIncident, SimilarityFinder, StaticSimilarityFinder};

use chrono::{DateTime, Local, SecondsFormat};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const DEFAULT_SERVICE: &str = "unknown";
pub const DEFAULT_ERROR: &str = "unknown";
pub const DEFAULT_SEVERITY: &str = "low";

/// Severity labels the scoring tables know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Exact, case-sensitive match. Anything else is unrecognized.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An incident as handed over by the pipeline.
///
/// Every field is optional. A field that is missing, `null`, or not a string
/// falls back to its default when read through the accessors.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IncidentRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub service: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub severity: Option<String>,
    /// Upstream hint, only consulted by the severity classifier.
    #[serde(default, rename = "severityHint", deserialize_with = "lenient_string")]
    pub severity_hint: Option<String>,
}

impl IncidentRecord {
    pub fn new(service: &str, error: &str, severity: &str) -> Self {
        Self {
            service: Some(service.to_string()),
            error: Some(error.to_string()),
            severity: Some(severity.to_string()),
            severity_hint: None,
        }
    }

    pub fn service(&self) -> &str {
        self.service.as_deref().unwrap_or(DEFAULT_SERVICE)
    }

    pub fn error(&self) -> &str {
        self.error.as_deref().unwrap_or(DEFAULT_ERROR)
    }

    pub fn severity_label(&self) -> &str {
        self.severity.as_deref().unwrap_or(DEFAULT_SEVERITY)
    }

    /// `None` for labels outside the known set.
    pub fn severity(&self) -> Option<Severity> {
        Severity::from_label(self.severity_label())
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

/// Suggested next step for the downstream operator or automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Escalate,
    AttemptRemediation,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Escalate => "escalate",
            Recommendation::AttemptRemediation => "attempt_remediation",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The triage decision emitted for one incident. Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Always `true`; marks the document as produced by this evaluator.
    pub ml_analysis: bool,
    pub risk_score: f64,
    pub predicted_resolution_minutes: u32,
    pub similar_incidents_count: usize,
    pub confidence: f64,
    pub recommendation: Recommendation,
    #[serde(serialize_with = "serialize_timestamp")]
    pub analyzed_at: DateTime<Local>,
}

fn serialize_timestamp<S>(ts: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, false))
}
