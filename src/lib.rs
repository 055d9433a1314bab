//! Copy-trading candidate scoring.
//!
//! Takes trader performance metrics (leaderboard snapshots or per-trader
//! evaluation files) and a risk profile, and produces:
//! - hard-filter verdicts with itemized rejection reasons
//! - derived risk metrics (RAR, consistency, recovery and profit factor)
//! - weighted 0-100 composite scores with a classification
//! - stable rankings, portfolio aggregates and grouped summary statistics
//!
//! Everything here is a pure function of its inputs. Reading files, picking
//! snapshots and printing live in the binary.

pub mod error;
pub mod metrics;
pub mod models;
pub mod ranking;
pub mod report;
pub mod scoring;

pub use error::{Result, ScoringError};
pub use metrics::{normalize, MetricsCalculator};
pub use models::{EvaluationRecord, LeaderboardSnapshot, RiskProfile, TraderMetrics};
pub use ranking::{aggregate_by_group, aggregate_portfolio, rank, RankedResult};
pub use report::{ConsolidatedReport, EvaluationAnalyzer, LeaderboardAnalyzer};
pub use scoring::{apply_hard_filters, AnalyzerConfig, FilterOverrides, HardFilter, Scorer, ScoringStrategy};
