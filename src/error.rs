//! Error types surfaced by the scoring engine.

use thiserror::Error;

/// Errors that reach the caller.
///
/// Numeric degeneracies (zero drawdown, empty ranges, missing optional
/// metrics) never produce an error; they resolve to defined defaults.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    /// Risk profile identifier outside `conservative | moderate | aggressive`.
    #[error("invalid risk profile: {0:?} (expected conservative, moderate or aggressive)")]
    InvalidProfile(String),

    /// A single trader record has the wrong shape. The batch continues
    /// without it.
    #[error("trader {trader}: field `{field}` {reason}")]
    MalformedTrader {
        trader: String,
        field: String,
        reason: String,
    },

    /// A leaderboard snapshot without the `data.data` trader array.
    #[error("snapshot has no trader list at `data.data`")]
    MissingTraderList,
}

pub type Result<T> = std::result::Result<T, ScoringError>;
