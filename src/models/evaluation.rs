//! Per-trader evaluation files.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::metrics::TraderMetrics;
use super::profile::RiskProfile;
use super::trader::as_count;

/// Name used when an evaluation has no `display_name`.
pub const UNKNOWN_TRADER: &str = "Unknown";

/// Style assumed when an evaluation has no `style`.
pub const DEFAULT_STYLE: &str = "mixed";

/// One evaluation file as written by the reviewers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    #[serde(default)]
    pub candidate: Candidate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_profile: Option<String>,

    /// Evaluation timestamp as written in the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of_utc: Option<String>,

    /// File the record was loaded from. Set by the loader.
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// scalping, swing, trend-following, arbitrage or mixed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(default)]
    pub metrics: CandidateMetrics,
}

/// Metrics block of an evaluation, percentages on the 0-100 scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi_30d_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi_90d_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi_180d_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_drawdown_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win_rate_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_leverage: Option<f64>,
    /// Integral floats such as `120.0` are accepted
    #[serde(default, deserialize_with = "copier_count", skip_serializing_if = "Option::is_none")]
    pub copiers: Option<u64>,
}

fn copier_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => as_count(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a non-negative integer copier count, got {value}"))),
    }
}

impl EvaluationRecord {
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_file = Some(source.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.candidate.display_name.as_deref().unwrap_or(UNKNOWN_TRADER)
    }

    pub fn style(&self) -> &str {
        self.candidate.style.as_deref().unwrap_or(DEFAULT_STYLE)
    }

    /// Profile this evaluation should be scored under. Missing means
    /// moderate; unknown names fall back to moderate with a warning.
    pub fn scoring_profile(&self) -> RiskProfile {
        self.risk_profile
            .as_deref()
            .map_or(RiskProfile::Moderate, RiskProfile::or_moderate)
    }

    /// Normalize into the engine's flat metrics record.
    pub fn to_metrics(&self) -> TraderMetrics {
        let m = &self.candidate.metrics;
        TraderMetrics {
            roi_30d: m.roi_30d_pct,
            roi_90d: m.roi_90d_pct,
            roi_180d: m.roi_180d_pct,
            max_drawdown: m.max_drawdown_pct,
            win_rate: m.win_rate_pct,
            avg_leverage: m.avg_leverage,
            followers: m.copiers,
            ..TraderMetrics::new(self.display_name())
        }
    }
}
