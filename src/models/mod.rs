//! Data models for traders, risk profiles and metrics.

mod evaluation;
mod metrics;
mod profile;
mod trader;

pub use evaluation::{Candidate, CandidateMetrics, EvaluationRecord, DEFAULT_STYLE, UNKNOWN_TRADER};
pub use metrics::{DerivedMetrics, TraderMetrics};
pub use profile::RiskProfile;
pub use trader::{LeaderboardSnapshot, LeaderboardTrader};
pub(crate) use trader::serialize_merged;
