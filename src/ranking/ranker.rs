//! Scored traders and their ordering.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{DerivedMetrics, RiskProfile, TraderMetrics};
use crate::scoring::ScoreBreakdown;

/// One scored and labelled trader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    /// Trader display name
    pub trader: String,

    /// Profile whose tables produced the score
    pub profile: RiskProfile,

    /// Composite score, 2 decimals
    pub total_score: f64,

    /// Tier / call label
    pub classification: String,

    /// Recommendation text
    pub recommendation: String,

    pub scores: ScoreBreakdown,

    /// Inputs the score was computed from
    pub metrics: TraderMetrics,

    pub derived_metrics: DerivedMetrics,
}

impl RankedResult {
    /// Whether this trader clears the allocation threshold.
    pub fn is_approved(&self) -> bool {
        self.total_score >= super::portfolio::APPROVAL_THRESHOLD
    }
}

/// Anything ordered by a composite score.
pub trait Scored {
    fn total_score(&self) -> f64;
}

impl Scored for RankedResult {
    fn total_score(&self) -> f64 {
        self.total_score
    }
}

/// Descending by `total_score`; equal scores keep their input order.
pub fn rank<T: Scored>(mut results: Vec<T>) -> Vec<T> {
    results.sort_by(|a, b| {
        b.total_score()
            .partial_cmp(&a.total_score())
            .unwrap_or(Ordering::Equal)
    });
    results
}
