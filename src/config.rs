//! TOML scoring tables for the incident evaluator.
//!
//! Every weight, keyword list and threshold the evaluator consults lives here.
//! The compiled-in defaults are the production tables; an override file may
//! replace any subset of them. A config is loaded once at startup, validated,
//! and then shared read-only.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::triage::Severity;

/// Environment variable naming an override file.
pub const CONFIG_ENV_VAR: &str = "INCIDENT_TRIAGE_CONFIG";

/// Standard system location for an override file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/incident-triage/scoring.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root scoring configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub risk: RiskTables,
    #[serde(default)]
    pub resolution: ResolutionTables,
    #[serde(default)]
    pub decision: DecisionConfig,
}

impl ScoringConfig {
    /// Load and validate configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!(path = %path.display(), "loaded scoring configuration");
        Ok(config)
    }

    /// Try to load configuration from, in order:
    /// 1. The path in the `INCIDENT_TRIAGE_CONFIG` environment variable.
    /// 2. `/etc/incident-triage/scoring.toml`.
    /// 3. Fall back to compiled-in defaults.
    pub fn load_or_default() -> Self {
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "INCIDENT_TRIAGE_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let system_path = Path::new(SYSTEM_CONFIG_PATH);
        if system_path.exists() {
            match Self::load(system_path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %system_path.display(),
                        error = %e,
                        "system config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in scoring tables");
        Self::default()
    }

    /// Reject tables that would break the evaluator's range guarantees.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let risk = &self.risk;
        non_negative("risk.critical_service_weight", risk.critical_service_weight)?;
        non_negative("risk.error_keyword_weight", risk.error_keyword_weight)?;
        non_negative("risk.severity_weights.critical", risk.severity_weights.critical)?;
        non_negative("risk.severity_weights.high", risk.severity_weights.high)?;
        non_negative("risk.severity_weights.medium", risk.severity_weights.medium)?;
        non_negative("risk.severity_weights.low", risk.severity_weights.low)?;
        non_negative(
            "risk.severity_weights.unrecognized",
            risk.severity_weights.unrecognized,
        )?;
        no_empty_entries("risk.critical_services", &risk.critical_services)?;
        no_empty_entries("risk.error_keywords", &risk.error_keywords)?;

        let resolution = &self.resolution;
        non_negative(
            "resolution.complexity_multiplier",
            resolution.complexity_multiplier,
        )?;
        no_empty_entries(
            "resolution.complexity_keywords",
            &resolution.complexity_keywords,
        )?;

        unit_interval(
            "decision.escalation_threshold",
            self.decision.escalation_threshold,
        )?;
        unit_interval("decision.confidence", self.decision.confidence)?;
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("must be a finite, non-negative number (got {value})"),
        });
    }
    Ok(())
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("must be within [0, 1] (got {value})"),
        });
    }
    Ok(())
}

fn no_empty_entries(field: &'static str, values: &[String]) -> Result<(), ConfigError> {
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(ConfigError::Invalid {
            field,
            reason: "entries must not be empty".to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

/// Additive risk factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskTables {
    /// Services whose failure is business critical (exact, case-sensitive).
    pub critical_services: Vec<String>,
    pub critical_service_weight: f64,
    /// Substrings searched for in the lowercased error text.
    pub error_keywords: Vec<String>,
    pub error_keyword_weight: f64,
    pub severity_weights: SeverityWeights,
}

impl Default for RiskTables {
    fn default() -> Self {
        Self {
            critical_services: vec![
                "auth".to_string(),
                "payment".to_string(),
                "database".to_string(),
            ],
            critical_service_weight: 0.4,
            error_keywords: vec!["down".to_string(), "timeout".to_string()],
            error_keyword_weight: 0.3,
            severity_weights: SeverityWeights::default(),
        }
    }
}

/// Risk contribution of each severity label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityWeights {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    /// Applied to labels outside the four known severities.
    pub unrecognized: f64,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            critical: 0.3,
            high: 0.2,
            medium: 0.1,
            low: 0.0,
            unrecognized: 0.0,
        }
    }
}

impl SeverityWeights {
    pub fn weight(&self, severity: Option<Severity>) -> f64 {
        match severity {
            Some(Severity::Critical) => self.critical,
            Some(Severity::High) => self.high,
            Some(Severity::Medium) => self.medium,
            Some(Severity::Low) => self.low,
            None => self.unrecognized,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolution-time estimation tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionTables {
    /// Substrings in the lowercased error text that mark a harder fix.
    pub complexity_keywords: Vec<String>,
    pub complexity_multiplier: f64,
    pub base_minutes: BaseMinutes,
}

impl Default for ResolutionTables {
    fn default() -> Self {
        Self {
            complexity_keywords: vec!["pool".to_string(), "connection".to_string()],
            complexity_multiplier: 1.5,
            base_minutes: BaseMinutes::default(),
        }
    }
}

/// Base resolution time per severity, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseMinutes {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub unrecognized: u32,
}

impl Default for BaseMinutes {
    fn default() -> Self {
        Self {
            critical: 30,
            high: 60,
            medium: 120,
            low: 240,
            unrecognized: 240,
        }
    }
}

impl BaseMinutes {
    pub fn minutes(&self, severity: Option<Severity>) -> u32 {
        match severity {
            Some(Severity::Critical) => self.critical,
            Some(Severity::High) => self.high,
            Some(Severity::Medium) => self.medium,
            Some(Severity::Low) => self.low,
            None => self.unrecognized,
        }
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Scores strictly above this escalate.
    pub escalation_threshold: f64,
    /// Reported confidence. Placeholder until a real model exists.
    pub confidence: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            escalation_threshold: 0.8,
            confidence: 0.85,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_sane() {
        let cfg = ScoringConfig::default();

        // Risk
        assert_eq!(cfg.risk.critical_services, ["auth", "payment", "database"]);
        assert_eq!(cfg.risk.critical_service_weight, 0.4);
        assert_eq!(cfg.risk.error_keywords, ["down", "timeout"]);
        assert_eq!(cfg.risk.error_keyword_weight, 0.3);
        assert_eq!(cfg.risk.severity_weights.weight(Some(Severity::Critical)), 0.3);
        assert_eq!(cfg.risk.severity_weights.weight(Some(Severity::High)), 0.2);
        assert_eq!(cfg.risk.severity_weights.weight(Some(Severity::Medium)), 0.1);
        assert_eq!(cfg.risk.severity_weights.weight(Some(Severity::Low)), 0.0);
        assert_eq!(cfg.risk.severity_weights.weight(None), 0.0);

        // Resolution
        assert_eq!(cfg.resolution.base_minutes.minutes(Some(Severity::Critical)), 30);
        assert_eq!(cfg.resolution.base_minutes.minutes(Some(Severity::High)), 60);
        assert_eq!(cfg.resolution.base_minutes.minutes(Some(Severity::Medium)), 120);
        assert_eq!(cfg.resolution.base_minutes.minutes(Some(Severity::Low)), 240);
        assert_eq!(cfg.resolution.base_minutes.minutes(None), 240);
        assert_eq!(cfg.resolution.complexity_keywords, ["pool", "connection"]);
        assert_eq!(cfg.resolution.complexity_multiplier, 1.5);

        // Decision
        assert_eq!(cfg.decision.escalation_threshold, 0.8);
        assert_eq!(cfg.decision.confidence, 0.85);

        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_parse_example_toml() {
        let toml_str = r#"
[risk]
critical_services = ["auth", "billing"]
critical_service_weight = 0.5
error_keywords = ["down", "timeout", "refused"]
error_keyword_weight = 0.25

[risk.severity_weights]
critical = 0.4
high = 0.3
medium = 0.15
low = 0.05
unrecognized = 0.0

[resolution]
complexity_keywords = ["pool"]
complexity_multiplier = 2.0

[resolution.base_minutes]
critical = 15
high = 45
medium = 90
low = 180
unrecognized = 300

[decision]
escalation_threshold = 0.7
confidence = 0.6
"#;

        let cfg: ScoringConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(cfg.risk.critical_services, ["auth", "billing"]);
        assert_eq!(cfg.risk.critical_service_weight, 0.5);
        assert_eq!(cfg.risk.error_keywords.len(), 3);
        assert_eq!(cfg.risk.error_keyword_weight, 0.25);
        assert_eq!(cfg.risk.severity_weights.low, 0.05);
        assert_eq!(cfg.resolution.complexity_keywords, ["pool"]);
        assert_eq!(cfg.resolution.complexity_multiplier, 2.0);
        assert_eq!(cfg.resolution.base_minutes.unrecognized, 300);
        assert_eq!(cfg.decision.escalation_threshold, 0.7);
        assert_eq!(cfg.decision.confidence, 0.6);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[risk.severity_weights]
high = 0.25
"#;

        let cfg: ScoringConfig = toml::from_str(toml_str).unwrap();

        // Explicit override.
        assert_eq!(cfg.risk.severity_weights.high, 0.25);

        // Everything else should be defaults.
        assert_eq!(cfg.risk.severity_weights.critical, 0.3);
        assert_eq!(cfg.risk.critical_services, ["auth", "payment", "database"]);
        assert_eq!(cfg.resolution, ResolutionTables::default());
        assert_eq!(cfg.decision, DecisionConfig::default());
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let cfg: ScoringConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, ScoringConfig::default());
    }

    #[test]
    fn test_defaults_roundtrip_through_toml() {
        let rendered = toml::to_string_pretty(&ScoringConfig::default()).unwrap();
        let parsed: ScoringConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, ScoringConfig::default());
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut cfg = ScoringConfig::default();
        cfg.risk.severity_weights.medium = -0.1;

        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "risk.severity_weights.medium", .. }
        ));
    }

    #[test]
    fn test_rejects_nan_multiplier() {
        let mut cfg = ScoringConfig::default();
        cfg.resolution.complexity_multiplier = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_threshold_outside_unit_interval() {
        let mut cfg = ScoringConfig::default();
        cfg.decision.escalation_threshold = 1.2;

        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("decision.escalation_threshold"));
    }

    #[test]
    fn test_rejects_blank_keyword() {
        let mut cfg = ScoringConfig::default();
        cfg.risk.error_keywords.push("  ".to_string());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[decision]\nconfidence = 0.5").unwrap();

        let cfg = ScoringConfig::load(file.path()).unwrap();
        assert_eq!(cfg.decision.confidence, 0.5);
        assert_eq!(cfg.decision.escalation_threshold, 0.8);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[decision]\nconfidence = 3.0").unwrap();

        let err = ScoringConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "decision.confidence", .. }));
    }

    #[test]
    fn test_load_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[risk\ncritical_service_weight = ").unwrap();

        let err = ScoringConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ScoringConfig::load(Path::new("/nonexistent/scoring.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
