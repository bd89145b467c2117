//! Historical incident lookup.
//!
//! Only a static stand-in exists today: it returns the same two matches for
//! every incident. A real search (vector index, incident database) plugs in
//! behind [`SimilarityFinder`] without touching the scoring code.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarIncident {
    pub id: String,
    /// In `[0, 1]`.
    pub similarity: f64,
}

pub trait SimilarityFinder: Send + Sync {
    fn find_similar(&self, service: &str, error: &str) -> Vec<SimilarIncident>;
}

const STATIC_MATCHES: [(&str, f64); 2] = [("INC-001", 0.9), ("INC-002", 0.7)];

/// Placeholder finder. Ignores its inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSimilarityFinder;

impl SimilarityFinder for StaticSimilarityFinder {
    fn find_similar(&self, _service: &str, _error: &str) -> Vec<SimilarIncident> {
        STATIC_MATCHES
            .iter()
            .map(|&(id, similarity)| SimilarIncident {
                id: id.to_string(),
                similarity,
            })
            .collect()
    }
}
