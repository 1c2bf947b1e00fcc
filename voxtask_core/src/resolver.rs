//! Fuzzy resolution of raw spans against known vocabularies.
//!
//! Transcribed names rarely match the configured vocabulary exactly
//! ("bobb" for "Bob"), so every resolution scores the raw text against
//! all candidates and keeps the full ranked matrix for diagnostics.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::similarity::similarity_ratio;

/// Sentinel returned when an assignee span is empty.
pub const ASSIGNEE_FALLBACK: &str = "Unknown";

/// Sentinel returned when a category span is empty.
pub const CATEGORY_FALLBACK: &str = "Uncategorized";

/// Default score below which a match is considered low-confidence.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// One scored vocabulary candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityEntry {
    pub candidate: String,
    pub score: f64,
}

/// All candidates ranked by descending score, ties in vocabulary order.
pub type SimilarityMatrix = Vec<SimilarityEntry>;

/// Outcome of one resolution call.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The resolved string: a vocabulary entry, the raw input when
    /// confidence is too low, or the empty fallback.
    pub resolved: String,
    pub matrix: SimilarityMatrix,
}

/// Maps raw extracted spans to the closest known vocabulary entry.
#[derive(Debug, Clone, Copy)]
pub struct EntityResolver {
    threshold: f64,
}

impl Default for EntityResolver {
    fn default() -> Self {
        Self::new(LOW_CONFIDENCE_THRESHOLD)
    }
}

impl EntityResolver {
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Resolve `raw` against `vocabulary`.
    ///
    /// - Empty or whitespace-only `raw` returns `empty_fallback` with an
    ///   empty matrix.
    /// - A best score at or above the threshold returns the best candidate.
    /// - Below the threshold the raw string is returned unchanged so the
    ///   caller can surface the ambiguity; the matrix is still populated.
    ///
    /// Total: never fails, always yields a usable string.
    #[must_use]
    pub fn resolve(&self, raw: &str, vocabulary: &[String], empty_fallback: &str) -> Resolution {
        if raw.trim().is_empty() {
            return Resolution {
                resolved: empty_fallback.to_string(),
                matrix: Vec::new(),
            };
        }

        let matrix = self.score_matrix(raw, vocabulary);

        let Some(best) = matrix.first() else {
            // Empty vocabulary: nothing to map onto.
            return Resolution {
                resolved: raw.to_string(),
                matrix,
            };
        };

        if best.score < self.threshold {
            warn!(
                raw,
                best = %best.candidate,
                score = best.score,
                "low similarity score, keeping raw text"
            );
            return Resolution {
                resolved: raw.to_string(),
                matrix,
            };
        }

        info!(
            raw,
            resolved = %best.candidate,
            score = best.score,
            "entity mapped"
        );
        Resolution {
            resolved: best.candidate.clone(),
            matrix,
        }
    }

    /// Score `raw` against every candidate, ranked descending.
    ///
    /// The sort is stable, so equal scores keep vocabulary order.
    #[must_use]
    pub fn score_matrix(&self, raw: &str, vocabulary: &[String]) -> SimilarityMatrix {
        let mut matrix: SimilarityMatrix = vocabulary
            .iter()
            .map(|candidate| SimilarityEntry {
                candidate: candidate.clone(),
                score: similarity_ratio(raw, candidate),
            })
            .collect();

        matrix.sort_by(|a, b| b.score.total_cmp(&a.score));
        matrix
    }
}
