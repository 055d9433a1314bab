//! Profile hard filters: independent eligibility checks that partition a
//! trader list into passed and rejected.

use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{serialize_merged, RiskProfile, TraderMetrics};

use super::config::{FilterOverrides, ProfileLimits};

/// A trader that failed at least one hard filter.
///
/// Serializes as the trader's own fields plus `rejection_reasons`, which
/// replaces any field of that name already on the trader.
#[derive(Debug, Clone)]
pub struct Rejected<T> {
    pub trader: T,
    pub rejection_reasons: Vec<String>,
}

impl<T: Serialize> Serialize for Rejected<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Reasons<'a> {
            rejection_reasons: &'a [String],
        }

        serialize_merged(
            serializer,
            &self.trader,
            &Reasons {
                rejection_reasons: &self.rejection_reasons,
            },
        )
    }
}

/// Result of running the hard filters over a list.
#[derive(Debug, Clone)]
pub struct FilterOutcome<T> {
    pub passed: Vec<T>,
    pub rejected: Vec<Rejected<T>>,
}

impl<T> FilterOutcome<T> {
    pub fn total(&self) -> usize {
        self.passed.len() + self.rejected.len()
    }
}

/// Applies one profile's bounds to traders.
#[derive(Debug, Clone)]
pub struct HardFilter {
    profile: RiskProfile,
    limits: ProfileLimits,
}

impl HardFilter {
    pub fn new(profile: RiskProfile) -> Self {
        Self {
            profile,
            limits: profile.limits(),
        }
    }

    /// Build from a profile name. Unknown names fail the whole call.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    pub fn with_overrides(mut self, overrides: &FilterOverrides) -> Self {
        self.limits = self.limits.with_overrides(overrides);
        self
    }

    pub fn profile(&self) -> RiskProfile {
        self.profile
    }

    pub fn limits(&self) -> &ProfileLimits {
        &self.limits
    }

    /// Every failed condition for one trader, in a fixed order. Empty means
    /// the trader passes. Missing fields read as 0.
    pub fn violations(&self, metrics: &TraderMetrics) -> Vec<String> {
        let l = &self.limits;
        let roi = metrics.headline_roi().unwrap_or(0.0);
        let win_rate = metrics.win_rate.unwrap_or(0.0);
        let leverage = metrics.avg_leverage.unwrap_or(0.0);
        let followers = metrics.followers.unwrap_or(0);

        let mut reasons = Vec::new();

        if roi < l.min_roi {
            reasons.push(format!("ROI too low ({:?}% < {:?}%)", roi, l.min_roi));
        }
        if roi > l.max_roi {
            reasons.push(format!("ROI too high ({:?}% > {:?}%)", roi, l.max_roi));
        }
        if win_rate < l.min_win_rate {
            reasons.push(format!("Win rate too low ({:?}% < {:?}%)", win_rate, l.min_win_rate));
        }
        if leverage < l.min_leverage {
            reasons.push(format!("Leverage too low ({:?}x < {:?}x)", leverage, l.min_leverage));
        }
        if leverage > l.max_leverage {
            reasons.push(format!("Leverage too high ({:?}x > {:?}x)", leverage, l.max_leverage));
        }
        if followers < l.min_followers {
            reasons.push(format!(
                "Insufficient followers ({} < {})",
                followers, l.min_followers
            ));
        }

        reasons
    }

    /// Partition traders into passed and rejected, preserving input order in
    /// both lists.
    pub fn apply<T, I>(&self, traders: I) -> FilterOutcome<T>
    where
        T: AsRef<TraderMetrics>,
        I: IntoIterator<Item = T>,
    {
        let mut passed = Vec::new();
        let mut rejected = Vec::new();

        for trader in traders {
            let reasons = self.violations(trader.as_ref());
            if reasons.is_empty() {
                passed.push(trader);
            } else {
                debug!(
                    trader = %trader.as_ref().display_name,
                    reasons = reasons.len(),
                    "Trader rejected by hard filters"
                );
                rejected.push(Rejected {
                    trader,
                    rejection_reasons: reasons,
                });
            }
        }

        info!(
            profile = %self.profile,
            passed = passed.len(),
            failed = rejected.len(),
            "Applied hard filters"
        );

        FilterOutcome { passed, rejected }
    }
}

/// Apply the named profile's hard filters, with optional bound overrides.
///
/// An unknown profile name is an error for the whole call.
pub fn apply_hard_filters<T, I>(
    traders: I,
    profile: &str,
    overrides: &FilterOverrides,
) -> Result<FilterOutcome<T>>
where
    T: AsRef<TraderMetrics>,
    I: IntoIterator<Item = T>,
{
    let filter = HardFilter::from_name(profile)?.with_overrides(overrides);
    Ok(filter.apply(traders))
}
