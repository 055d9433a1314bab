//! Trader metrics as fed to the engine, and the secondary metrics derived
//! from them during a scoring pass.

use serde::{Deserialize, Serialize};

use crate::metrics::normalize::{serialize_round2, serialize_round2_opt};

/// Flat per-trader record, normalized at the input boundary.
///
/// Percentages are on the 0-100 scale. Every numeric field is optional;
/// missing data degrades to a neutral or zero sub-score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraderMetrics {
    /// Display name / nickname
    pub display_name: String,

    /// ROI over the last 30 days (%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi_30d: Option<f64>,

    /// ROI over the last 90 days (%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi_90d: Option<f64>,

    /// ROI over the last 180 days (%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi_180d: Option<f64>,

    /// ROI for sources that report a single period and no window history
    /// (leaderboard snapshots).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi: Option<f64>,

    /// Measured maximum drawdown (%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_drawdown: Option<f64>,

    /// Win rate (%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win_rate: Option<f64>,

    /// Average leverage multiplier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_leverage: Option<f64>,

    /// Followers / copiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,

    /// Total PnL (leaderboard only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnl: Option<f64>,

    /// Leaderboard rank (leaderboard only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u64>,
}

impl TraderMetrics {
    /// Create empty metrics for a trader.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    /// The ROI used for filtering, scoring and portfolio aggregation.
    ///
    /// The single-period ROI wins when present; otherwise the 90 day window.
    pub fn headline_roi(&self) -> Option<f64> {
        self.roi.or(self.roi_90d)
    }

    /// ROI windows that are present, shortest first.
    pub fn roi_windows(&self) -> Vec<f64> {
        [self.roi_30d, self.roi_90d, self.roi_180d]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl AsRef<TraderMetrics> for TraderMetrics {
    fn as_ref(&self) -> &TraderMetrics {
        self
    }
}

/// Secondary metrics derived for one trader in one scoring pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Maximum drawdown used for scoring (%). `None` when neither measured
    /// nor estimable.
    #[serde(serialize_with = "serialize_round2_opt")]
    pub max_drawdown: Option<f64>,

    /// True when `max_drawdown` is the leverage/ROI heuristic rather than a
    /// measured value.
    pub drawdown_estimated: bool,

    /// (ROI - risk free rate) / max drawdown, 0 when drawdown is 0
    #[serde(serialize_with = "serialize_round2")]
    pub rar: f64,

    /// 0-1, higher is steadier
    #[serde(serialize_with = "serialize_round2")]
    pub consistency: f64,

    /// ROI / max drawdown, 0 when drawdown is 0
    #[serde(serialize_with = "serialize_round2")]
    pub recovery_factor: f64,

    /// Estimated gross win / gross loss
    #[serde(serialize_with = "serialize_round2")]
    pub profit_factor: f64,
}
