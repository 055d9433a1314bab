//! Summary statistics over many evaluations, overall and per group.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::metrics::normalize::round2;
use crate::models::{EvaluationRecord, TraderMetrics};

/// Group name for evaluations without a value for the grouping key.
pub const UNKNOWN_GROUP: &str = "unknown";

/// min / max / mean / median of one numeric field, 2 decimals.
///
/// The median is the element at index `n / 2` of the sorted values, with no
/// interpolation on even-sized inputs. All fields are 0 when there are no
/// values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub median: f64,
}

impl FieldStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Self {
            min: round2(Statistics::min(values.iter())),
            max: round2(Statistics::max(values.iter())),
            avg: round2(values.iter().mean()),
            median: round2(sorted[sorted.len() / 2]),
        }
    }
}

/// Per-field statistics over a set of traders. Traders missing a field are
/// left out of that field's statistics only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub total_traders: usize,
    pub roi_90d: FieldStats,
    pub max_drawdown: FieldStats,
    pub win_rate: FieldStats,
    pub avg_leverage: FieldStats,
    pub copiers: FieldStats,
}

impl SummaryStatistics {
    pub fn from_metrics<'a, I>(traders: I) -> Self
    where
        I: IntoIterator<Item = &'a TraderMetrics>,
    {
        let mut total = 0;
        let mut roi = Vec::new();
        let mut dd = Vec::new();
        let mut wr = Vec::new();
        let mut lev = Vec::new();
        let mut copiers = Vec::new();

        for m in traders {
            total += 1;
            roi.extend(m.roi_90d);
            dd.extend(m.max_drawdown);
            wr.extend(m.win_rate);
            lev.extend(m.avg_leverage);
            copiers.extend(m.followers.map(|c| c as f64));
        }

        Self {
            total_traders: total,
            roi_90d: FieldStats::from_values(&roi),
            max_drawdown: FieldStats::from_values(&dd),
            win_rate: FieldStats::from_values(&wr),
            avg_leverage: FieldStats::from_values(&lev),
            copiers: FieldStats::from_values(&copiers),
        }
    }
}

/// Attribute evaluations are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    RiskProfile,
    Style,
}

impl GroupKey {
    /// Group name of one evaluation. The profile is taken as written, so
    /// unknown profile names form their own group.
    pub fn key_of(self, record: &EvaluationRecord) -> String {
        match self {
            GroupKey::RiskProfile => record
                .risk_profile
                .clone()
                .unwrap_or_else(|| UNKNOWN_GROUP.to_string()),
            GroupKey::Style => record.style().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub count: usize,
    pub statistics: SummaryStatistics,
}

/// Group evaluations and summarize each group. Groups are ordered by name.
pub fn aggregate_by_group(evaluations: &[EvaluationRecord], key: GroupKey) -> BTreeMap<String, GroupSummary> {
    let mut groups: BTreeMap<String, Vec<TraderMetrics>> = BTreeMap::new();
    for record in evaluations {
        groups
            .entry(key.key_of(record))
            .or_default()
            .push(record.to_metrics());
    }

    groups
        .into_iter()
        .map(|(name, members)| {
            let summary = GroupSummary {
                count: members.len(),
                statistics: SummaryStatistics::from_metrics(&members),
            };
            (name, summary)
        })
        .collect()
}
