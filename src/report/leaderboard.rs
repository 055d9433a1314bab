//! Leaderboard snapshot analysis: hard filters, scoring on the leaderboard
//! path, ranking and report assembly.

use std::fmt;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use serde_json::Value;
use statrs::statistics::Statistics;
use tracing::info;

use crate::error::Result;
use crate::metrics::round2;
use crate::models::{serialize_merged, DerivedMetrics, LeaderboardSnapshot, LeaderboardTrader, RiskProfile};
use crate::ranking::{rank, RankedResult, Scored};
use crate::scoring::{AnalyzerConfig, HardFilter, Rejected, ScoreBreakdown, Scorer, ScoringStrategy};

/// Version stamped into report metadata.
pub const ANALYZER_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub analyzed_at: DateTime<Utc>,
    pub profile: RiskProfile,
    /// Snapshot metadata, unchanged
    pub source_snapshot: Value,
    pub analyzer_version: &'static str,
}

/// Counts and score range of one analysis. Score fields are absent when no
/// trader passed the filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeaderboardStats {
    pub traders_analyzed: usize,
    pub traders_passed_filters: usize,
    pub traders_failed_filters: usize,
    /// Snapshot entries dropped before filtering for data-shape problems
    pub traders_skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
}

/// A trader that passed the filters: the snapshot entry as received, plus
/// its score and recommendation. Analysis fields replace snapshot fields of
/// the same name when serialized.
#[derive(Debug, Clone)]
pub struct LeaderboardCandidate {
    pub trader: LeaderboardTrader,
    pub profile: RiskProfile,
    pub total_score: f64,
    pub classification: String,
    pub recommendation: String,
    pub derived_metrics: DerivedMetrics,
    pub scores: ScoreBreakdown,
}

impl LeaderboardCandidate {
    fn new(trader: LeaderboardTrader, result: RankedResult) -> Self {
        Self {
            trader,
            profile: result.profile,
            total_score: result.total_score,
            classification: result.classification,
            recommendation: result.recommendation,
            derived_metrics: result.derived_metrics,
            scores: result.scores,
        }
    }

    pub fn name(&self) -> &str {
        &self.trader.metrics().display_name
    }
}

impl Serialize for LeaderboardCandidate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Analysis<'a> {
            profile: RiskProfile,
            total_score: f64,
            classification: &'a str,
            recommendation: &'a str,
            derived_metrics: &'a DerivedMetrics,
            scores: &'a ScoreBreakdown,
        }

        serialize_merged(
            serializer,
            &self.trader,
            &Analysis {
                profile: self.profile,
                total_score: self.total_score,
                classification: &self.classification,
                recommendation: &self.recommendation,
                derived_metrics: &self.derived_metrics,
                scores: &self.scores,
            },
        )
    }
}

impl Scored for LeaderboardCandidate {
    fn total_score(&self) -> f64 {
        self.total_score
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardReport {
    pub metadata: ReportMetadata,
    pub stats: LeaderboardStats,
    /// Best first
    pub candidates: Vec<LeaderboardCandidate>,
    pub rejected: Vec<Rejected<LeaderboardTrader>>,
}

impl LeaderboardReport {
    /// Keep only the best `top_n` candidates. Stats and the rejected list
    /// still describe the full analysis.
    pub fn truncate(&mut self, top_n: usize) {
        self.candidates.truncate(top_n);
    }

    pub fn best(&self) -> Option<&LeaderboardCandidate> {
        self.candidates.first()
    }
}

impl fmt::Display for LeaderboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!(" LEADERBOARD ANALYSIS: {} ", self.metadata.profile.as_str().to_uppercase());
        writeln!(f, "\n{:=^78}", title)?;
        writeln!(f)?;
        writeln!(f, "Analyzed:    {}", self.metadata.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "Traders:     {}", self.stats.traders_analyzed)?;
        writeln!(f, "Passed:      {}", self.stats.traders_passed_filters)?;
        writeln!(f, "Rejected:    {}", self.stats.traders_failed_filters)?;
        if self.stats.traders_skipped > 0 {
            writeln!(f, "Skipped:     {} (malformed)", self.stats.traders_skipped)?;
        }
        if let (Some(avg), Some(max), Some(min)) = (self.stats.avg_score, self.stats.max_score, self.stats.min_score) {
            writeln!(f, "Scores:      avg {:.2} / max {:.2} / min {:.2}", avg, max, min)?;
        }

        if !self.candidates.is_empty() {
            writeln!(f)?;
            writeln!(f, "{:<4} {:<20} {:>8} {:>8} {:>7} {:>6}  {}", "#", "Trader", "Score", "ROI", "WR", "Lev", "Call")?;
            writeln!(f, "{}", "-".repeat(78))?;
            for (i, c) in self.candidates.iter().enumerate() {
                let m = c.trader.metrics();
                writeln!(
                    f,
                    "{:<4} {:<20} {:>8.2} {:>7.1}% {:>6.1}% {:>5.1}x  {}",
                    i + 1,
                    truncate(&m.display_name, 20),
                    c.total_score,
                    m.roi.unwrap_or(0.0),
                    m.win_rate.unwrap_or(0.0),
                    m.avg_leverage.unwrap_or(0.0),
                    c.classification,
                )?;
            }
        }
        writeln!(f, "{:=^78}", "")?;
        Ok(())
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

/// Analyzes leaderboard snapshots under one risk profile.
#[derive(Debug, Clone)]
pub struct LeaderboardAnalyzer {
    filter: HardFilter,
    scorer: Scorer,
}

impl LeaderboardAnalyzer {
    /// Unknown profile names are an error: filtering never guesses.
    pub fn new(profile: &str, config: &AnalyzerConfig) -> Result<Self> {
        Ok(Self::for_profile(profile.parse()?, config))
    }

    pub fn for_profile(profile: RiskProfile, config: &AnalyzerConfig) -> Self {
        Self {
            filter: HardFilter::new(profile).with_overrides(&config.overrides),
            scorer: Scorer::new(profile, ScoringStrategy::Leaderboard)
                .with_overrides(&config.overrides)
                .with_risk_free_rate(config.risk_free_rate),
        }
    }

    pub fn profile(&self) -> RiskProfile {
        self.filter.profile()
    }

    /// Filter, score and rank one snapshot.
    pub fn analyze(&self, snapshot: &LeaderboardSnapshot, analyzed_at: DateTime<Utc>) -> LeaderboardReport {
        info!(
            profile = %self.profile(),
            traders = snapshot.len(),
            "Analyzing leaderboard snapshot"
        );

        let outcome = self.filter.apply(snapshot.traders.iter().cloned());
        let results = self.scorer.evaluate_all(&outcome.passed);

        let candidates: Vec<LeaderboardCandidate> = outcome
            .passed
            .into_iter()
            .zip(results)
            .map(|(trader, result)| LeaderboardCandidate::new(trader, result))
            .collect();
        let candidates = rank(candidates);

        let mut stats = LeaderboardStats {
            traders_analyzed: snapshot.len(),
            traders_passed_filters: candidates.len(),
            traders_failed_filters: outcome.rejected.len(),
            traders_skipped: snapshot.skipped.len(),
            ..Default::default()
        };
        if !candidates.is_empty() {
            let scores: Vec<f64> = candidates.iter().map(|c| c.total_score).collect();
            stats.avg_score = Some(round2(scores.iter().mean()));
            stats.max_score = Some(round2(Statistics::max(scores.iter())));
            stats.min_score = Some(round2(Statistics::min(scores.iter())));
        }

        if let Some(best) = candidates.first() {
            info!(
                profile = %self.profile(),
                candidates = candidates.len(),
                best = %best.name(),
                best_score = best.total_score,
                "Leaderboard analysis complete"
            );
        } else {
            info!(profile = %self.profile(), "No candidates passed the hard filters");
        }

        LeaderboardReport {
            metadata: ReportMetadata {
                analyzed_at,
                profile: self.profile(),
                source_snapshot: snapshot.metadata.clone(),
                analyzer_version: ANALYZER_VERSION,
            },
            stats,
            candidates,
            rejected: outcome.rejected,
        }
    }
}

/// Analyze one snapshot under every profile in parallel, most restrictive
/// profile first.
pub fn analyze_all_profiles(
    snapshot: &LeaderboardSnapshot,
    config: &AnalyzerConfig,
    analyzed_at: DateTime<Utc>,
) -> Vec<LeaderboardReport> {
    RiskProfile::ALL
        .par_iter()
        .map(|profile| LeaderboardAnalyzer::for_profile(*profile, config).analyze(snapshot, analyzed_at))
        .collect()
}
