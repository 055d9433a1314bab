//! Weighted composite scoring of traders.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::metrics::normalize::{normalize, round2};
use crate::metrics::MetricsCalculator;
use crate::models::{DerivedMetrics, RiskProfile, TraderMetrics};
use crate::ranking::RankedResult;

use super::config::{FilterOverrides, ProfileLimits, ScoringWeights};
use super::strategy::ScoringStrategy;

/// Upper end of the RAR scoring range; anything above saturates at 100.
pub const RAR_CEILING: f64 = 10.0;

/// Five sub-scores (0-100 each) and their weighted composite.
///
/// Sub-scores keep full precision; `total_score` is the 2-decimal display
/// value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub drawdown_score: f64,
    pub win_rate_score: f64,
    pub roi_score: f64,
    pub consistency_score: f64,
    pub rar_score: f64,
    pub total_score: f64,
}

/// Scores traders under one profile on one call path.
#[derive(Debug, Clone)]
pub struct Scorer {
    profile: RiskProfile,
    strategy: ScoringStrategy,
    limits: ProfileLimits,
    weights: ScoringWeights,
    risk_free_rate: f64,
}

impl Scorer {
    pub fn new(profile: RiskProfile, strategy: ScoringStrategy) -> Self {
        Self {
            profile,
            strategy,
            limits: profile.limits(),
            weights: profile.weights(),
            risk_free_rate: 0.0,
        }
    }

    /// Build from a profile name, scoring with the moderate tables when the
    /// name is unknown.
    pub fn from_name(name: &str, strategy: ScoringStrategy) -> Self {
        Self::new(RiskProfile::or_moderate(name), strategy)
    }

    pub fn with_overrides(mut self, overrides: &FilterOverrides) -> Self {
        self.limits = self.limits.with_overrides(overrides);
        self
    }

    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    pub fn profile(&self) -> RiskProfile {
        self.profile
    }

    pub fn strategy(&self) -> ScoringStrategy {
        self.strategy
    }

    /// Derive the secondary metrics for a trader on this scorer's path.
    pub fn derive(&self, trader: &TraderMetrics) -> DerivedMetrics {
        MetricsCalculator::derive(trader, self.strategy, self.risk_free_rate)
    }

    /// Composite score for one trader.
    ///
    /// Returns the full-precision total together with the breakdown. A
    /// missing input scores 0 on its axis.
    pub fn score(&self, trader: &TraderMetrics, derived: &DerivedMetrics) -> (f64, ScoreBreakdown) {
        let l = &self.limits;
        let w = &self.weights;

        let drawdown_score = derived
            .max_drawdown
            .map_or(0.0, |dd| normalize(dd, 0.0, l.max_drawdown, true));
        let win_rate_score = trader
            .win_rate
            .map_or(0.0, |wr| normalize(wr, l.min_win_rate, 100.0, false));
        let roi_score = trader
            .headline_roi()
            .map_or(0.0, |roi| normalize(roi, l.min_roi, l.max_roi, false));
        let consistency_score = derived.consistency * 100.0;
        let rar_score = normalize(derived.rar, 0.0, RAR_CEILING, false);

        let total = drawdown_score * w.max_drawdown
            + win_rate_score * w.win_rate
            + roi_score * w.roi
            + consistency_score * w.consistency
            + rar_score * w.rar;

        let breakdown = ScoreBreakdown {
            drawdown_score,
            win_rate_score,
            roi_score,
            consistency_score,
            rar_score,
            total_score: round2(total),
        };

        (total, breakdown)
    }

    /// Derive, score and label one trader.
    pub fn evaluate(&self, trader: &TraderMetrics) -> RankedResult {
        let derived = self.derive(trader);
        let (total, scores) = self.score(trader, &derived);
        let verdict = self.strategy.verdict(total, scores.total_score);

        RankedResult {
            trader: trader.display_name.clone(),
            profile: self.profile,
            total_score: scores.total_score,
            classification: verdict.label().to_string(),
            recommendation: verdict.recommendation(),
            scores,
            metrics: trader.clone(),
            derived_metrics: derived,
        }
    }

    /// Evaluate a batch in parallel. Output order matches input order.
    pub fn evaluate_all<T>(&self, traders: &[T]) -> Vec<RankedResult>
    where
        T: AsRef<TraderMetrics> + Sync,
    {
        traders
            .par_iter()
            .map(|t| self.evaluate(t.as_ref()))
            .collect()
    }
}
