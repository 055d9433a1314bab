//! Report assembly for the two input kinds: leaderboard snapshots and
//! per-trader evaluation files.

mod evaluation;
mod leaderboard;

pub use evaluation::{
    ConsolidatedEntry, ConsolidatedReport, ConsolidationMetadata, EvaluationAnalyzer, EvaluationReport, RiskMetrics,
    TraderAnalysis,
};
pub use leaderboard::{
    analyze_all_profiles, LeaderboardAnalyzer, LeaderboardCandidate, LeaderboardReport, LeaderboardStats,
    ReportMetadata, ANALYZER_VERSION,
};
