//! Combines risk, resolution and similarity into one triage decision.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::config::ScoringConfig;
use crate::triage::clock::{Clock, SystemClock};
use crate::triage::resolution::{self, ResolutionEstimate};
use crate::triage::risk::{self, RiskFactors};
use crate::triage::similarity::{SimilarIncident, SimilarityFinder, StaticSimilarityFinder};
use crate::triage::{AnalysisResult, IncidentRecord};

/// How a result was reached. Diagnostic only; never part of the result document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskBreakdown {
    pub service: String,
    pub error: String,
    pub severity: String,
    pub factors: RiskFactors,
    /// Sum of `factors` before clamping.
    pub raw_total: f64,
    pub risk_score: f64,
    pub resolution: ResolutionEstimate,
    pub similar: Vec<SimilarIncident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Explained {
    pub result: AnalysisResult,
    pub breakdown: RiskBreakdown,
}

/// Stateless incident evaluator.
///
/// Holds only read-only state, so a single instance can serve any number of
/// callers concurrently.
pub struct Evaluator<C = SystemClock, F = StaticSimilarityFinder> {
    config: Arc<ScoringConfig>,
    clock: C,
    finder: F,
}

impl Evaluator {
    /// Evaluator on the local clock with the static similarity finder.
    pub fn new(config: Arc<ScoringConfig>) -> Self {
        Self::with_parts(config, SystemClock, StaticSimilarityFinder)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(Arc::new(ScoringConfig::default()))
    }
}

impl<C: Clock, F: SimilarityFinder> Evaluator<C, F> {
    pub fn with_parts(config: Arc<ScoringConfig>, clock: C, finder: F) -> Self {
        Self {
            config,
            clock,
            finder,
        }
    }

    /// Score one incident. Total: missing fields take their defaults.
    pub fn evaluate(&self, record: &IncidentRecord) -> AnalysisResult {
        self.evaluate_explained(record).result
    }

    pub fn evaluate_explained(&self, record: &IncidentRecord) -> Explained {
        let service = record.service();
        let error = record.error();
        let severity = record.severity();

        let factors = risk::assess(&self.config.risk, service, error, severity);
        let risk_score = factors.score();
        let estimate = resolution::estimate(&self.config.resolution, severity, error);
        let similar = self.finder.find_similar(service, error);
        let recommendation = risk::recommend(risk_score, self.config.decision.escalation_threshold);

        debug!(
            %service,
            severity = record.severity_label(),
            risk_score,
            minutes = estimate.minutes,
            %recommendation,
            "incident evaluated"
        );

        let result = AnalysisResult {
            ml_analysis: true,
            risk_score,
            predicted_resolution_minutes: estimate.minutes,
            similar_incidents_count: similar.len(),
            confidence: risk::clamp_unit(self.config.decision.confidence),
            recommendation,
            analyzed_at: self.clock.now(),
        };

        let breakdown = RiskBreakdown {
            service: service.to_string(),
            error: error.to_string(),
            severity: record.severity_label().to_string(),
            factors,
            raw_total: factors.total(),
            risk_score,
            resolution: estimate,
            similar,
        };

        Explained { result, breakdown }
    }
}

/// Evaluate with the compiled-in tables, the local clock and the static finder.
pub fn evaluate(record: &IncidentRecord) -> AnalysisResult {
    let evaluator: Evaluator = Evaluator::default();
    evaluator.evaluate(record)
}
