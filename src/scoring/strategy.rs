//! The two scoring call paths and their verdict scales.
//!
//! Evaluation files carry measured drawdown and ROI windows; leaderboard
//! snapshots carry neither. The two paths derive drawdown and consistency
//! differently and label results on different scales, so they stay separate
//! variants rather than one blended formula.

use serde::{Deserialize, Serialize};

/// Which call path a trader is scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Evaluation files: measured drawdown, consistency from ROI windows,
    /// five-tier [`Classification`].
    Evaluation,
    /// Leaderboard snapshots: estimated drawdown, win rate as the consistency
    /// proxy, five-step [`LeaderboardCall`].
    Leaderboard,
}

impl ScoringStrategy {
    /// Label a composite score on this path's scale.
    ///
    /// `total` is the full-precision composite and `rounded` its 2-decimal
    /// display value. Evaluation reports classify the rounded value,
    /// leaderboard reports the raw one.
    pub fn verdict(self, total: f64, rounded: f64) -> Verdict {
        match self {
            ScoringStrategy::Evaluation => Verdict::Tier(Classification::from_score(rounded)),
            ScoringStrategy::Leaderboard => Verdict::Call(LeaderboardCall::from_score(total)),
        }
    }
}

/// Five-tier classification used in evaluation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Classification {
    Poor,
    Marginal,
    Acceptable,
    Good,
    Excellent,
}

impl Classification {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Self::Excellent
        } else if score >= 70.0 {
            Self::Good
        } else if score >= 55.0 {
            Self::Acceptable
        } else if score >= 40.0 {
            Self::Marginal
        } else {
            Self::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Acceptable => "Acceptable",
            Self::Marginal => "Marginal",
            Self::Poor => "Poor",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Excellent => "Immediate approval",
            Self::Good => "Approve with review",
            Self::Acceptable => "Detailed review required",
            Self::Marginal => "Reject or monitor",
            Self::Poor => "Reject",
        }
    }
}

/// Coarser recommendation scale used in leaderboard candidate reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaderboardCall {
    Pass,
    Watch,
    Hold,
    Buy,
    StrongBuy,
}

impl LeaderboardCall {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::StrongBuy
        } else if score >= 70.0 {
            Self::Buy
        } else if score >= 60.0 {
            Self::Hold
        } else if score >= 50.0 {
            Self::Watch
        } else {
            Self::Pass
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG BUY",
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Watch => "WATCH",
            Self::Pass => "PASS",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::StrongBuy => "Excellent candidate",
            Self::Buy => "Good candidate",
            Self::Hold => "Consider for diversification",
            Self::Watch => "Monitor progress",
            Self::Pass => "Does not meet criteria",
        }
    }
}

/// A label on either scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Tier(Classification),
    Call(LeaderboardCall),
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Tier(c) => c.label(),
            Verdict::Call(c) => c.label(),
        }
    }

    /// Human-readable recommendation text.
    pub fn recommendation(&self) -> String {
        match self {
            Verdict::Tier(c) => c.recommendation().to_string(),
            Verdict::Call(c) => format!("{} - {}", c.label(), c.description()),
        }
    }
}
