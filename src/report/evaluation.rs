//! Evaluation-file analysis: ranked comparison with portfolio aggregates,
//! single-trader breakdowns, and consolidated multi-profile reports.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::metrics::normalize::serialize_round2;
use crate::metrics::{MetricsCalculator, SlippageEstimate};
use crate::models::{EvaluationRecord, RiskProfile, TraderMetrics};
use crate::ranking::{
    aggregate_by_group, aggregate_portfolio, rank, AllocationPlan, GroupKey, GroupSummary, PortfolioAggregate,
    RankedResult, Scored, SummaryStatistics,
};
use crate::scoring::{AnalyzerConfig, HardFilter, Rejected, Scorer, ScoringStrategy};

/// Ranking of several evaluated traders under one profile.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub analysis_date: DateTime<Utc>,
    pub risk_profile: RiskProfile,
    pub total_traders: usize,
    /// Best first
    pub ranking: Vec<RankedResult>,
    /// Equal-weight aggregates over the ranking
    pub portfolio_metrics: PortfolioAggregate,
    pub allocations: AllocationPlan,
    /// Traders screened out before ranking. Empty unless screening is on.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<Rejected<TraderMetrics>>,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!(" TRADER RANKING: {} ", self.risk_profile.as_str().to_uppercase());
        writeln!(f, "\n{:=^70}", title)?;
        writeln!(f)?;
        writeln!(f, "Traders analyzed: {}", self.total_traders)?;
        if !self.rejected.is_empty() {
            writeln!(f, "Screened out:     {}", self.rejected.len())?;
        }
        writeln!(f)?;

        for (i, r) in self.ranking.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, r.trader)?;
            writeln!(f, "   Score: {:.2}/100 - {}", r.total_score, r.classification)?;
            writeln!(
                f,
                "   ROI 90d: {} | Max DD: {} | Win Rate: {}",
                pct(r.metrics.roi_90d),
                pct(r.metrics.max_drawdown),
                pct(r.metrics.win_rate)
            )?;
            writeln!(f, "   -> {}", r.recommendation)?;
            writeln!(f)?;
        }

        let p = &self.portfolio_metrics;
        writeln!(f, "--- Portfolio (equal weight) ---")?;
        writeln!(f, "ROI 90d:     {:.2}%", p.portfolio_roi_90d)?;
        writeln!(f, "Max DD:      {:.2}%", p.portfolio_max_dd)?;
        writeln!(f, "Win Rate:    {:.2}%", p.portfolio_win_rate)?;
        writeln!(f, "Leverage:    {:.2}x", p.portfolio_avg_leverage)?;
        writeln!(f, "Traders:     {}", p.num_traders)?;
        writeln!(f)?;

        writeln!(f, "--- Allocations ---")?;
        if self.allocations.is_empty() {
            writeln!(f, "No trader meets the minimum score (>= 70)")?;
        } else {
            writeln!(f, "Approved traders: {}", self.allocations.approved_count)?;
            for a in &self.allocations.allocations {
                writeln!(
                    f,
                    "  {}: {:.1}% of portfolio (score {:.2})",
                    a.trader, a.allocation_pct, a.total_score
                )?;
            }
        }
        writeln!(f, "{:=^70}", "")?;
        Ok(())
    }
}

/// RAR, recovery factor and consistency of one trader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskMetrics {
    #[serde(serialize_with = "serialize_round2")]
    pub rar: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub recovery_factor: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub consistency: f64,
}

/// Full breakdown of one evaluated trader.
#[derive(Debug, Clone, Serialize)]
pub struct TraderAnalysis {
    #[serde(flatten)]
    pub result: RankedResult,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of_utc: Option<String>,

    pub style: String,

    /// Present only when both ROI 90d and max drawdown are known and non-zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_metrics: Option<RiskMetrics>,

    pub slippage: SlippageEstimate,
}

impl fmt::Display for TraderAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.result;
        let m = &r.metrics;
        let s = &r.scores;

        writeln!(f, "\n{:=^70}", format!(" TRADER ANALYSIS: {} ", r.trader))?;
        writeln!(f)?;
        writeln!(f, "Risk profile:  {}", r.profile.as_str().to_uppercase())?;
        writeln!(f, "Evaluated:     {}", self.as_of_utc.as_deref().unwrap_or("N/A"))?;
        writeln!(f)?;
        writeln!(f, "--- Metrics ---")?;
        writeln!(f, "ROI 90d:       {}", pct(m.roi_90d))?;
        writeln!(f, "Max Drawdown:  {}", pct(m.max_drawdown))?;
        writeln!(f, "Win Rate:      {}", pct(m.win_rate))?;
        match m.avg_leverage {
            Some(lev) => writeln!(f, "Leverage:      {lev}x")?,
            None => writeln!(f, "Leverage:      N/A")?,
        }
        match m.followers {
            Some(n) => writeln!(f, "Copiers:       {n}")?,
            None => writeln!(f, "Copiers:       N/A")?,
        }
        writeln!(f)?;
        writeln!(f, "--- Scores ---")?;
        writeln!(f, "Drawdown:      {:.2}/100", s.drawdown_score)?;
        writeln!(f, "Win Rate:      {:.2}/100", s.win_rate_score)?;
        writeln!(f, "ROI:           {:.2}/100", s.roi_score)?;
        writeln!(f, "Consistency:   {:.2}/100", s.consistency_score)?;
        writeln!(f, "RAR:           {:.2}/100", s.rar_score)?;
        writeln!(f)?;
        writeln!(f, "TOTAL:         {:.2}/100", r.total_score)?;
        writeln!(f, "Class:         {}", r.classification)?;
        writeln!(f, "Recommendation: {}", r.recommendation)?;

        if let Some(risk) = &self.risk_metrics {
            writeln!(f)?;
            writeln!(f, "--- Derived ---")?;
            writeln!(f, "Risk-Adjusted Return: {:.2}", risk.rar)?;
            writeln!(f, "Recovery Factor:      {:.2}", risk.recovery_factor)?;
            writeln!(f, "Consistency:          {:.2}", risk.consistency)?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "Estimated slippage ({}): {}% - {}%",
            self.style, self.slippage.min_pct, self.slippage.max_pct
        )?;
        writeln!(f, "{:=^70}", "")?;
        Ok(())
    }
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v}%"))
}

fn evaluation_scorer(profile: RiskProfile, config: &AnalyzerConfig) -> Scorer {
    Scorer::new(profile, ScoringStrategy::Evaluation)
        .with_overrides(&config.overrides)
        .with_risk_free_rate(config.risk_free_rate)
}

/// Scores evaluation files on the evaluation path.
#[derive(Debug, Clone)]
pub struct EvaluationAnalyzer {
    scorer: Scorer,
    screen: Option<HardFilter>,
}

impl EvaluationAnalyzer {
    /// Unknown profile names score with the moderate tables.
    pub fn new(profile: &str, config: &AnalyzerConfig) -> Self {
        Self::for_profile(RiskProfile::or_moderate(profile), config)
    }

    pub fn for_profile(profile: RiskProfile, config: &AnalyzerConfig) -> Self {
        Self {
            scorer: evaluation_scorer(profile, config),
            screen: None,
        }
    }

    /// Run traders through `filter` before ranking them.
    pub fn with_screen(mut self, filter: HardFilter) -> Self {
        self.screen = Some(filter);
        self
    }

    pub fn profile(&self) -> RiskProfile {
        self.scorer.profile()
    }

    /// Score and rank, best first. Ties keep file order.
    pub fn rank(&self, records: &[EvaluationRecord]) -> Vec<RankedResult> {
        let metrics: Vec<TraderMetrics> = records.iter().map(EvaluationRecord::to_metrics).collect();
        rank(self.scorer.evaluate_all(&metrics))
    }

    /// Ranking, portfolio aggregates and the allocation shortlist.
    pub fn analyze(&self, records: &[EvaluationRecord], analysis_date: DateTime<Utc>) -> EvaluationReport {
        let metrics: Vec<TraderMetrics> = records.iter().map(EvaluationRecord::to_metrics).collect();

        let (eligible, rejected) = match &self.screen {
            Some(filter) => {
                let outcome = filter.apply(metrics);
                (outcome.passed, outcome.rejected)
            }
            None => (metrics, Vec::new()),
        };

        let ranking = rank(self.scorer.evaluate_all(&eligible));
        let portfolio_metrics = aggregate_portfolio(&ranking, None);
        let allocations = AllocationPlan::from_ranking(&ranking);

        info!(
            profile = %self.profile(),
            traders = ranking.len(),
            approved = allocations.approved_count,
            "Ranked evaluation files"
        );

        EvaluationReport {
            analysis_date,
            risk_profile: self.profile(),
            total_traders: ranking.len(),
            ranking,
            portfolio_metrics,
            allocations,
            rejected,
        }
    }

    /// Detailed breakdown of one evaluation. Screening does not apply.
    pub fn analyze_single(&self, record: &EvaluationRecord) -> TraderAnalysis {
        let result = self.scorer.evaluate(&record.to_metrics());
        let m = &result.metrics;

        let risk_metrics = match (m.roi_90d, m.max_drawdown) {
            (Some(roi), Some(dd)) if roi != 0.0 && dd != 0.0 => Some(RiskMetrics {
                rar: result.derived_metrics.rar,
                recovery_factor: result.derived_metrics.recovery_factor,
                consistency: result.derived_metrics.consistency,
            }),
            _ => None,
        };

        debug!(trader = %result.trader, score = result.total_score, "Analyzed single trader");

        TraderAnalysis {
            as_of_utc: record.as_of_utc.clone(),
            style: record.style().to_string(),
            slippage: MetricsCalculator::estimate_slippage(record.style()),
            risk_metrics,
            result,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsolidationMetadata {
    pub generated_at: DateTime<Utc>,
    pub total_evaluations: usize,
    /// Group names present in `by_risk_profile`
    pub risk_profiles: Vec<String>,
    pub filter_applied: Option<RiskProfile>,
}

/// One trader in the consolidated ranking, scored under its own profile.
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidatedEntry {
    pub trader: String,
    pub risk_profile: RiskProfile,
    pub total_score: f64,
    pub classification: String,
    pub recommendation: String,
    pub metrics: TraderMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

impl Scored for ConsolidatedEntry {
    fn total_score(&self) -> f64 {
        self.total_score
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsolidatedReport {
    pub report_metadata: ConsolidationMetadata,
    pub summary_statistics: SummaryStatistics,
    /// Best first
    pub traders_ranking: Vec<ConsolidatedEntry>,
    pub by_risk_profile: BTreeMap<String, GroupSummary>,
}

impl ConsolidatedReport {
    /// Score every evaluation under the profile it names (moderate when it
    /// names none or an unknown one), rank them together and summarize.
    ///
    /// With `filter`, only evaluations naming that profile are included.
    pub fn build(
        records: &[EvaluationRecord],
        filter: Option<RiskProfile>,
        config: &AnalyzerConfig,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let selected: Vec<EvaluationRecord> = match filter {
            Some(profile) => records
                .iter()
                .filter(|r| r.risk_profile.as_deref().and_then(|p| p.parse().ok()) == Some(profile))
                .cloned()
                .collect(),
            None => records.to_vec(),
        };

        let entries: Vec<ConsolidatedEntry> = selected
            .par_iter()
            .map(|record| {
                let result = evaluation_scorer(record.scoring_profile(), config).evaluate(&record.to_metrics());
                ConsolidatedEntry {
                    trader: result.trader,
                    risk_profile: result.profile,
                    total_score: result.total_score,
                    classification: result.classification,
                    recommendation: result.recommendation,
                    metrics: result.metrics,
                    source_file: record.source_file.clone(),
                }
            })
            .collect();

        let all_metrics: Vec<TraderMetrics> = selected.iter().map(EvaluationRecord::to_metrics).collect();
        let by_risk_profile = aggregate_by_group(&selected, GroupKey::RiskProfile);

        info!(
            evaluations = selected.len(),
            groups = by_risk_profile.len(),
            filter = ?filter,
            "Built consolidated report"
        );

        Self {
            report_metadata: ConsolidationMetadata {
                generated_at,
                total_evaluations: selected.len(),
                risk_profiles: by_risk_profile.keys().cloned().collect(),
                filter_applied: filter,
            },
            summary_statistics: SummaryStatistics::from_metrics(&all_metrics),
            traders_ranking: rank(entries),
            by_risk_profile,
        }
    }
}

impl fmt::Display for ConsolidatedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary_statistics;
        writeln!(f, "\n{:=^70}", " CONSOLIDATED SUMMARY ")?;
        writeln!(f)?;
        writeln!(f, "Evaluations: {}", self.report_metadata.total_evaluations)?;
        for (name, group) in &self.by_risk_profile {
            writeln!(f, "  {:<14} {}", name, group.count)?;
        }
        writeln!(f)?;
        for (label, stats) in [
            ("ROI 90d", &s.roi_90d),
            ("Max DD", &s.max_drawdown),
            ("Win Rate", &s.win_rate),
        ] {
            writeln!(
                f,
                "{:<10} min {:>8.2}  max {:>8.2}  avg {:>8.2}  median {:>8.2}",
                label, stats.min, stats.max, stats.avg, stats.median
            )?;
        }
        writeln!(f)?;
        writeln!(f, "--- Top traders ---")?;
        for (i, e) in self.traders_ranking.iter().take(10).enumerate() {
            writeln!(
                f,
                "{:>2}. {:<24} {:>6.2}  {:<11} {}",
                i + 1,
                e.trader,
                e.total_score,
                e.classification,
                e.risk_profile
            )?;
        }
        writeln!(f, "{:=^70}", "")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, CandidateMetrics};
    use crate::scoring::FilterOverrides;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()
    }

    fn record(name: &str, profile: Option<&str>, roi: [f64; 3], dd: f64, wr: f64, lev: f64) -> EvaluationRecord {
        EvaluationRecord {
            candidate: Candidate {
                display_name: Some(name.to_string()),
                style: Some("swing".to_string()),
                metrics: CandidateMetrics {
                    roi_30d_pct: Some(roi[0]),
                    roi_90d_pct: Some(roi[1]),
                    roi_180d_pct: Some(roi[2]),
                    max_drawdown_pct: Some(dd),
                    win_rate_pct: Some(wr),
                    avg_leverage: Some(lev),
                    copiers: Some(250),
                },
            },
            risk_profile: profile.map(str::to_string),
            as_of_utc: Some("2025-01-31T00:00:00Z".to_string()),
            source_file: None,
        }
    }

    fn records() -> Vec<EvaluationRecord> {
        vec![
            record("Average", Some("moderate"), [10.0, 30.0, 55.0], 15.0, 58.0, 2.0),
            record("Star", Some("moderate"), [18.0, 55.0, 100.0], 4.0, 75.0, 2.0),
            record("Safe", Some("conservative"), [7.0, 22.0, 45.0], 6.0, 66.0, 1.0),
            record("Wild", Some("aggressive"), [-20.0, 120.0, 60.0], 30.0, 51.0, 4.0),
        ]
    }

    #[test]
    fn test_analyze_ranks_and_aggregates() {
        let analyzer = EvaluationAnalyzer::new("moderate", &AnalyzerConfig::default());
        let report = analyzer.analyze(&records(), at());

        assert_eq!(report.total_traders, 4);
        assert_eq!(report.ranking[0].trader, "Star");
        for pair in report.ranking.windows(2) {
            assert!(pair[0].total_score >= pair[1].total_score);
        }
        assert_eq!(report.portfolio_metrics.num_traders, 4);
        // (30 + 55 + 22 + 120) / 4
        assert_eq!(report.portfolio_metrics.portfolio_roi_90d, 56.75);
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn test_allocations_follow_approved_count() {
        let analyzer = EvaluationAnalyzer::new("moderate", &AnalyzerConfig::default());
        let report = analyzer.analyze(&records(), at());

        let approved = report.ranking.iter().filter(|r| r.is_approved()).count();
        assert_eq!(report.allocations.approved_count, approved);
        for a in &report.allocations.allocations {
            assert!(a.allocation_pct <= dec!(30));
            assert!(a.total_score >= 70.0);
        }
    }

    #[test]
    fn test_screening_removes_out_of_bounds_traders() {
        let analyzer = EvaluationAnalyzer::new("moderate", &AnalyzerConfig::default())
            .with_screen(HardFilter::new(RiskProfile::Moderate));
        let report = analyzer.analyze(&records(), at());

        let names: Vec<_> = report.rejected.iter().map(|r| r.trader.display_name.as_str()).collect();
        assert!(names.contains(&"Wild"));
        assert_eq!(report.total_traders + report.rejected.len(), 4);
    }

    #[test]
    fn test_unknown_profile_scores_as_moderate() {
        let a = EvaluationAnalyzer::new("whatever", &AnalyzerConfig::default()).rank(&records());
        let b = EvaluationAnalyzer::new("moderate", &AnalyzerConfig::default()).rank(&records());
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_analysis() {
        let analyzer = EvaluationAnalyzer::new("moderate", &AnalyzerConfig::default());
        let analysis = analyzer.analyze_single(&records()[1]);

        assert_eq!(analysis.result.trader, "Star");
        assert_eq!(analysis.style, "swing");
        assert_eq!(analysis.slippage, SlippageEstimate { min_pct: 0.1, max_pct: 0.5 });

        let risk = analysis.risk_metrics.unwrap();
        assert!((risk.rar - 55.0 / 4.0).abs() < 1e-9);
        assert!((risk.recovery_factor - 55.0 / 4.0).abs() < 1e-9);

        let v = serde_json::to_value(&analysis).unwrap();
        assert_eq!(v["trader"], "Star");
        assert!(v["scores"]["roi_score"].is_number());
    }

    #[test]
    fn test_single_analysis_without_drawdown() {
        let mut r = records()[0].clone();
        r.candidate.metrics.max_drawdown_pct = None;
        r.candidate.style = None;
        let analysis = EvaluationAnalyzer::new("moderate", &AnalyzerConfig::default()).analyze_single(&r);

        assert!(analysis.risk_metrics.is_none());
        assert_eq!(analysis.style, "mixed");
        assert_eq!(analysis.result.scores.drawdown_score, 0.0);
        assert!(analysis.to_string().contains("N/A"));
    }

    #[test]
    fn test_consolidated_report() {
        let mut input = records();
        input.push(record("Drifter", None, [5.0, 25.0, 30.0], 12.0, 56.0, 1.5).with_source("drifter.json"));

        let report = ConsolidatedReport::build(&input, None, &AnalyzerConfig::default(), at());

        assert_eq!(report.report_metadata.total_evaluations, 5);
        assert_eq!(
            report.report_metadata.risk_profiles,
            vec!["aggressive", "conservative", "moderate", "unknown"]
        );
        assert_eq!(report.by_risk_profile["moderate"].count, 2);
        assert_eq!(report.summary_statistics.total_traders, 5);
        // sorted roi_90d: 22, 25, 30, 55, 120
        assert_eq!(report.summary_statistics.roi_90d.median, 30.0);

        let drifter = report.traders_ranking.iter().find(|e| e.trader == "Drifter").unwrap();
        assert_eq!(drifter.risk_profile, RiskProfile::Moderate);
        assert_eq!(drifter.source_file.as_deref(), Some("drifter.json"));

        let wild = report.traders_ranking.iter().find(|e| e.trader == "Wild").unwrap();
        assert_eq!(wild.risk_profile, RiskProfile::Aggressive);
    }

    #[test]
    fn test_consolidated_filter() {
        let report = ConsolidatedReport::build(
            &records(),
            Some(RiskProfile::Moderate),
            &AnalyzerConfig::default(),
            at(),
        );
        assert_eq!(report.report_metadata.total_evaluations, 2);
        assert_eq!(report.report_metadata.risk_profiles, vec!["moderate"]);

        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["report_metadata"]["filter_applied"], "moderate");
    }

    #[test]
    fn test_consolidated_empty() {
        let report = ConsolidatedReport::build(&[], None, &AnalyzerConfig::default(), at());
        assert!(report.traders_ranking.is_empty());
        assert_eq!(report.summary_statistics.roi_90d.avg, 0.0);
    }

    #[test]
    fn test_overrides_reach_scoring() {
        let config = AnalyzerConfig {
            overrides: FilterOverrides {
                max_drawdown: Some(40.0),
                ..Default::default()
            },
            ..Default::default()
        };
        let strict = EvaluationAnalyzer::new("moderate", &AnalyzerConfig::default()).rank(&records());
        let relaxed = EvaluationAnalyzer::new("moderate", &config).rank(&records());

        let score = |rs: &[RankedResult], name: &str| {
            rs.iter().find(|r| r.trader == name).map(|r| r.scores.drawdown_score).unwrap()
        };
        assert!(score(&relaxed, "Average") > score(&strict, "Average"));
    }
}
