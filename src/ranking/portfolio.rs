//! Portfolio-level aggregates over a set of ranked traders, and the
//! approved-trader allocation shortlist.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::metrics::normalize::round2;

use super::RankedResult;

/// Minimum composite score for a trader to receive an allocation.
pub const APPROVAL_THRESHOLD: f64 = 70.0;

/// Maximum number of approved traders that receive an allocation.
pub const MAX_SHORTLIST: usize = 5;

/// Per-trader allocation cap when auto-distributing, in percent.
pub const MAX_ALLOCATION_PCT: Decimal = dec!(30);

/// Allocation-weighted averages across a trader set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAggregate {
    pub portfolio_roi_90d: f64,
    pub portfolio_max_dd: f64,
    pub portfolio_win_rate: f64,
    pub portfolio_avg_leverage: f64,
    pub num_traders: usize,
}

/// Weighted averages of ROI, drawdown, win rate and leverage.
///
/// Without `allocations` every trader gets `100 / n`. Given allocations are
/// normalized to sum to 1 (when their sum is positive) and paired with
/// traders in order; surplus entries on either side are ignored. Missing
/// metrics contribute 0. Values are rounded to 2 decimals.
pub fn aggregate_portfolio(ranked: &[RankedResult], allocations: Option<&[f64]>) -> PortfolioAggregate {
    let n = ranked.len();
    if n == 0 {
        return PortfolioAggregate::default();
    }

    let mut weights: Vec<f64> = match allocations {
        Some(a) => a.to_vec(),
        None => vec![100.0 / n as f64; n],
    };

    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        for w in &mut weights {
            *w /= total;
        }
    }

    let mut roi = 0.0;
    let mut dd = 0.0;
    let mut win_rate = 0.0;
    let mut leverage = 0.0;

    for (r, w) in ranked.iter().zip(&weights) {
        let m = &r.metrics;
        roi += m.headline_roi().unwrap_or(0.0) * w;
        dd += m.max_drawdown.or(r.derived_metrics.max_drawdown).unwrap_or(0.0) * w;
        win_rate += m.win_rate.unwrap_or(0.0) * w;
        leverage += m.avg_leverage.unwrap_or(0.0) * w;
    }

    PortfolioAggregate {
        portfolio_roi_90d: round2(roi),
        portfolio_max_dd: round2(dd),
        portfolio_win_rate: round2(win_rate),
        portfolio_avg_leverage: round2(leverage),
        num_traders: n,
    }
}

/// Suggested share of the portfolio for one approved trader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub trader: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub allocation_pct: Decimal,
    pub total_score: f64,
}

/// Allocation shortlist over the approved traders of a ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    /// Number of traders at or above the approval threshold
    pub approved_count: usize,
    /// The best approved traders with their share, best first
    pub allocations: Vec<Allocation>,
}

impl AllocationPlan {
    /// Equal split across all approved traders, capped per trader, listed
    /// for the top [`MAX_SHORTLIST`] of them. Expects `ranked` best first.
    pub fn from_ranking(ranked: &[RankedResult]) -> Self {
        let approved: Vec<&RankedResult> = ranked.iter().filter(|r| r.is_approved()).collect();
        if approved.is_empty() {
            return Self::default();
        }

        let share = (dec!(100) / Decimal::from(approved.len()))
            .min(MAX_ALLOCATION_PCT)
            .round_dp(2);

        let allocations = approved
            .iter()
            .take(MAX_SHORTLIST)
            .map(|r| Allocation {
                trader: r.trader.clone(),
                allocation_pct: share,
                total_score: r.total_score,
            })
            .collect();

        Self {
            approved_count: approved.len(),
            allocations,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DerivedMetrics, RiskProfile, TraderMetrics};
    use crate::scoring::ScoreBreakdown;

    fn ranked(name: &str, score: f64, roi_90d: f64, dd: f64, wr: f64, lev: f64) -> RankedResult {
        RankedResult {
            trader: name.to_string(),
            profile: RiskProfile::Moderate,
            total_score: score,
            classification: String::new(),
            recommendation: String::new(),
            scores: ScoreBreakdown::default(),
            metrics: TraderMetrics {
                roi_90d: Some(roi_90d),
                max_drawdown: Some(dd),
                win_rate: Some(wr),
                avg_leverage: Some(lev),
                ..TraderMetrics::new(name)
            },
            derived_metrics: DerivedMetrics::default(),
        }
    }

    #[test]
    fn test_equal_weights() {
        let traders = vec![
            ranked("a", 80.0, 40.0, 10.0, 60.0, 2.0),
            ranked("b", 75.0, 60.0, 20.0, 70.0, 3.0),
        ];
        let agg = aggregate_portfolio(&traders, None);

        assert_eq!(agg.portfolio_roi_90d, 50.0);
        assert_eq!(agg.portfolio_max_dd, 15.0);
        assert_eq!(agg.portfolio_win_rate, 65.0);
        assert_eq!(agg.portfolio_avg_leverage, 2.5);
        assert_eq!(agg.num_traders, 2);
    }

    #[test]
    fn test_allocations_are_normalized() {
        let traders = vec![
            ranked("a", 80.0, 40.0, 10.0, 60.0, 2.0),
            ranked("b", 75.0, 60.0, 20.0, 70.0, 3.0),
        ];
        // 3:1 expressed in arbitrary units
        let agg = aggregate_portfolio(&traders, Some(&[75.0, 25.0]));
        assert_eq!(agg.portfolio_roi_90d, 45.0);

        let agg = aggregate_portfolio(&traders, Some(&[3.0, 1.0]));
        assert_eq!(agg.portfolio_roi_90d, 45.0);
    }

    #[test]
    fn test_missing_metrics_contribute_zero() {
        let mut t = ranked("a", 80.0, 40.0, 10.0, 60.0, 2.0);
        t.metrics.avg_leverage = None;
        let agg = aggregate_portfolio(&[t], None);
        assert_eq!(agg.portfolio_avg_leverage, 0.0);
        assert_eq!(agg.portfolio_roi_90d, 40.0);
    }

    #[test]
    fn test_estimated_drawdown_used_when_unmeasured() {
        let mut t = ranked("a", 80.0, 40.0, 10.0, 60.0, 2.0);
        t.metrics.max_drawdown = None;
        t.derived_metrics.max_drawdown = Some(6.0);
        assert_eq!(aggregate_portfolio(&[t], None).portfolio_max_dd, 6.0);
    }

    #[test]
    fn test_empty_portfolio() {
        let agg = aggregate_portfolio(&[], None);
        assert_eq!(agg.num_traders, 0);
        assert_eq!(agg.portfolio_roi_90d, 0.0);
    }

    #[test]
    fn test_allocation_cap() {
        let traders = vec![
            ranked("a", 90.0, 40.0, 10.0, 60.0, 2.0),
            ranked("b", 72.0, 40.0, 10.0, 60.0, 2.0),
            ranked("c", 50.0, 40.0, 10.0, 60.0, 2.0),
        ];
        let plan = AllocationPlan::from_ranking(&traders);

        assert_eq!(plan.approved_count, 2);
        assert_eq!(plan.allocations.len(), 2);
        // 100 / 2 = 50, capped at 30
        assert_eq!(plan.allocations[0].allocation_pct, dec!(30));
    }

    #[test]
    fn test_allocation_shortlist_limit() {
        let traders: Vec<_> = (0..8)
            .map(|i| ranked(&format!("t{i}"), 95.0 - i as f64, 40.0, 10.0, 60.0, 2.0))
            .collect();
        let plan = AllocationPlan::from_ranking(&traders);

        assert_eq!(plan.approved_count, 8);
        assert_eq!(plan.allocations.len(), MAX_SHORTLIST);
        assert_eq!(plan.allocations[0].allocation_pct, dec!(12.5));
        assert_eq!(plan.allocations[4].trader, "t4");
    }

    #[test]
    fn test_no_approved_traders() {
        let plan = AllocationPlan::from_ranking(&[ranked("a", 69.0, 40.0, 10.0, 60.0, 2.0)]);
        assert!(plan.is_empty());
        assert_eq!(plan.approved_count, 0);
    }
}
