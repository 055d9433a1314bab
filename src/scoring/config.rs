//! Per-profile hard-filter bounds and scoring weights.
//!
//! The tables are compile-time constants; per-call customization goes through
//! [`FilterOverrides`], which yields a modified copy and never touches the
//! tables themselves.

use serde::{Deserialize, Serialize};

use crate::models::RiskProfile;

/// Hard-filter bounds for one risk profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileLimits {
    /// Minimum ROI (%)
    pub min_roi: f64,

    /// Maximum ROI (%); higher returns suggest a riskier style than the profile allows
    pub max_roi: f64,

    /// Drawdown ceiling (%); also the upper end of the drawdown scoring range
    pub max_drawdown: f64,

    /// Minimum win rate (%)
    pub min_win_rate: f64,

    /// Minimum average leverage
    pub min_leverage: f64,

    /// Maximum average leverage
    pub max_leverage: f64,

    /// Minimum followers / copiers
    pub min_followers: u64,

    /// Minimum days of trading history
    pub min_days_active: u32,
}

/// Weights of the five sub-scores in the composite. Each table sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub roi: f64,
    pub consistency: f64,
    pub rar: f64,
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.max_drawdown + self.win_rate + self.roi + self.consistency + self.rar
    }
}

const CONSERVATIVE_LIMITS: ProfileLimits = ProfileLimits {
    min_roi: 10.0,
    max_roi: 30.0,
    max_drawdown: 10.0,
    min_win_rate: 60.0,
    min_leverage: 1.0,
    max_leverage: 2.0,
    min_followers: 200,
    min_days_active: 180,
};

const MODERATE_LIMITS: ProfileLimits = ProfileLimits {
    min_roi: 20.0,
    max_roi: 60.0,
    max_drawdown: 20.0,
    min_win_rate: 55.0,
    min_leverage: 1.0,
    max_leverage: 3.0,
    min_followers: 100,
    min_days_active: 90,
};

const AGGRESSIVE_LIMITS: ProfileLimits = ProfileLimits {
    min_roi: 40.0,
    max_roi: 200.0,
    max_drawdown: 35.0,
    min_win_rate: 50.0,
    min_leverage: 2.0,
    max_leverage: 5.0,
    min_followers: 50,
    min_days_active: 60,
};

const CONSERVATIVE_WEIGHTS: ScoringWeights = ScoringWeights {
    max_drawdown: 0.30,
    win_rate: 0.25,
    roi: 0.15,
    consistency: 0.20,
    rar: 0.10,
};

const MODERATE_WEIGHTS: ScoringWeights = ScoringWeights {
    max_drawdown: 0.25,
    win_rate: 0.20,
    roi: 0.25,
    consistency: 0.15,
    rar: 0.15,
};

const AGGRESSIVE_WEIGHTS: ScoringWeights = ScoringWeights {
    max_drawdown: 0.20,
    win_rate: 0.15,
    roi: 0.30,
    consistency: 0.10,
    rar: 0.25,
};

impl RiskProfile {
    /// Hard-filter bounds for this profile.
    pub const fn limits(self) -> ProfileLimits {
        match self {
            RiskProfile::Conservative => CONSERVATIVE_LIMITS,
            RiskProfile::Moderate => MODERATE_LIMITS,
            RiskProfile::Aggressive => AGGRESSIVE_LIMITS,
        }
    }

    /// Composite score weights for this profile.
    pub const fn weights(self) -> ScoringWeights {
        match self {
            RiskProfile::Conservative => CONSERVATIVE_WEIGHTS,
            RiskProfile::Moderate => MODERATE_WEIGHTS,
            RiskProfile::Aggressive => AGGRESSIVE_WEIGHTS,
        }
    }
}

/// Ad hoc per-call replacements for a profile's bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOverrides {
    #[serde(default)]
    pub min_roi: Option<f64>,
    #[serde(default)]
    pub max_drawdown: Option<f64>,
    #[serde(default)]
    pub min_win_rate: Option<f64>,
}

impl FilterOverrides {
    pub fn is_empty(&self) -> bool {
        self.min_roi.is_none() && self.max_drawdown.is_none() && self.min_win_rate.is_none()
    }
}

impl ProfileLimits {
    /// Copy of these limits with any overridden bound replaced.
    pub fn with_overrides(mut self, overrides: &FilterOverrides) -> Self {
        if let Some(v) = overrides.min_roi {
            self.min_roi = v;
        }
        if let Some(v) = overrides.max_drawdown {
            self.max_drawdown = v;
        }
        if let Some(v) = overrides.min_win_rate {
            self.min_win_rate = v;
        }
        self
    }
}

/// Settings shared by the analyzers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Risk-free rate (%) subtracted from ROI in the risk-adjusted return
    #[serde(default)]
    pub risk_free_rate: f64,

    /// Keep only the best N candidates in exported reports
    #[serde(default)]
    pub top_n: Option<usize>,

    /// Bound overrides applied on top of the profile table
    #[serde(default)]
    pub overrides: FilterOverrides,
}
