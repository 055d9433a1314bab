//! Profile configuration, hard filters and composite scoring.

mod config;
mod filter;
mod scorer;
mod strategy;

pub use config::{AnalyzerConfig, FilterOverrides, ProfileLimits, ScoringWeights};
pub use filter::{apply_hard_filters, FilterOutcome, HardFilter, Rejected};
pub use scorer::{ScoreBreakdown, Scorer, RAR_CEILING};
pub use strategy::{Classification, LeaderboardCall, ScoringStrategy, Verdict};
