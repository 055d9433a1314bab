//! Calculator for derived trader metrics: RAR, consistency, recovery factor,
//! profit factor and the leaderboard drawdown estimate.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::models::{DerivedMetrics, TraderMetrics};
use crate::scoring::ScoringStrategy;

/// Consistency reported when fewer than two ROI windows are available.
pub const NEUTRAL_CONSISTENCY: f64 = 0.5;

/// Leverage multiplier in the drawdown estimate.
const LEVERAGE_DRAWDOWN_FACTOR: f64 = 2.5;

/// Share of |ROI| in the drawdown estimate.
const ROI_DRAWDOWN_FACTOR: f64 = 0.3;

/// Expected slippage range for a trading style, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlippageEstimate {
    pub min_pct: f64,
    pub max_pct: f64,
}

/// Calculator for computing derived trader metrics.
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Derive the secondary metrics for one trader on the given call path.
    ///
    /// Never fails: missing inputs degrade the affected value to 0 or its
    /// documented default.
    pub fn derive(
        metrics: &TraderMetrics,
        strategy: ScoringStrategy,
        risk_free_rate: f64,
    ) -> DerivedMetrics {
        match strategy {
            ScoringStrategy::Evaluation => Self::derive_evaluation(metrics, risk_free_rate),
            ScoringStrategy::Leaderboard => Self::derive_leaderboard(metrics, risk_free_rate),
        }
    }

    /// Evaluation files: measured drawdown, consistency across ROI windows.
    fn derive_evaluation(metrics: &TraderMetrics, risk_free_rate: f64) -> DerivedMetrics {
        let (rar, recovery_factor) = match (metrics.headline_roi(), metrics.max_drawdown) {
            (Some(roi), Some(dd)) => (
                Self::risk_adjusted_return(roi, dd, risk_free_rate),
                Self::recovery_factor(roi, dd),
            ),
            _ => (0.0, 0.0),
        };

        DerivedMetrics {
            max_drawdown: metrics.max_drawdown,
            drawdown_estimated: false,
            rar,
            consistency: Self::consistency_from_windows(&metrics.roi_windows()),
            recovery_factor,
            profit_factor: Self::profit_factor(
                metrics.pnl.unwrap_or(0.0),
                metrics.rank,
                metrics.win_rate.unwrap_or(0.0),
            ),
        }
    }

    /// Leaderboard snapshots: no drawdown history, so estimate it unless the
    /// record happens to carry a measured value. Win rate stands in for
    /// consistency.
    fn derive_leaderboard(metrics: &TraderMetrics, risk_free_rate: f64) -> DerivedMetrics {
        let roi = metrics.headline_roi().unwrap_or(0.0);
        let win_rate = metrics.win_rate.unwrap_or(0.0);

        let (max_dd, estimated) = match metrics.max_drawdown {
            Some(dd) => (dd, false),
            None => (
                Self::estimate_max_drawdown(metrics.avg_leverage.unwrap_or(0.0), roi),
                true,
            ),
        };

        DerivedMetrics {
            max_drawdown: Some(max_dd),
            drawdown_estimated: estimated,
            rar: Self::risk_adjusted_return(roi, max_dd, risk_free_rate),
            consistency: Self::consistency_from_win_rate(win_rate),
            recovery_factor: Self::recovery_factor(roi, max_dd),
            profit_factor: Self::profit_factor(metrics.pnl.unwrap_or(0.0), metrics.rank, win_rate),
        }
    }

    /// RAR = (ROI - risk free rate) / max drawdown; 0 when drawdown is 0.
    pub fn risk_adjusted_return(roi: f64, max_drawdown: f64, risk_free_rate: f64) -> f64 {
        if max_drawdown == 0.0 {
            return 0.0;
        }
        (roi - risk_free_rate) / max_drawdown
    }

    /// Recovery factor = ROI / max drawdown; 0 when drawdown is 0.
    pub fn recovery_factor(roi: f64, max_drawdown: f64) -> f64 {
        if max_drawdown == 0.0 {
            return 0.0;
        }
        roi / max_drawdown
    }

    /// Consistency = 1 - population stddev / |mean| across ROI windows,
    /// clamped to [0, 1].
    ///
    /// Fewer than two windows gives the neutral 0.5; a zero mean gives 0.
    pub fn consistency_from_windows(windows: &[f64]) -> f64 {
        if windows.len() < 2 {
            return NEUTRAL_CONSISTENCY;
        }

        let mean = windows.mean();
        if mean == 0.0 {
            return 0.0;
        }

        let std_dev = windows.population_std_dev();
        (1.0 - std_dev / mean.abs()).clamp(0.0, 1.0)
    }

    /// Win rate (%) as a 0-1 consistency proxy for data without windows.
    pub fn consistency_from_win_rate(win_rate: f64) -> f64 {
        (win_rate / 100.0).clamp(0.0, 1.0)
    }

    /// Heuristic drawdown for leaderboard data:
    /// `min(leverage * 2.5, |ROI| * 0.3)`.
    pub fn estimate_max_drawdown(avg_leverage: f64, roi: f64) -> f64 {
        (avg_leverage * LEVERAGE_DRAWDOWN_FACTOR).min(roi.abs() * ROI_DRAWDOWN_FACTOR)
    }

    /// Profit factor estimated from PnL and win rate.
    ///
    /// The average win is PnL / rank (or PnL alone without a rank); the loss
    /// side is floored at 1.
    pub fn profit_factor(pnl: f64, rank: Option<u64>, win_rate: f64) -> f64 {
        let avg_win = match rank {
            Some(r) if r > 0 => pnl / r as f64,
            _ => pnl,
        };
        let p = win_rate / 100.0;

        (avg_win * p) / (avg_win * (1.0 - p)).max(1.0)
    }

    /// Expected slippage for a trading style.
    pub fn estimate_slippage(style: &str) -> SlippageEstimate {
        let (min_pct, max_pct) = match style.to_lowercase().as_str() {
            "scalping" => (0.5, 2.0),
            "swing" => (0.1, 0.5),
            "trend-following" => (0.05, 0.2),
            "arbitrage" => (0.1, 0.3),
            "mixed" => (0.2, 0.8),
            _ => (0.1, 0.5),
        };
        SlippageEstimate { min_pct, max_pct }
    }
}
