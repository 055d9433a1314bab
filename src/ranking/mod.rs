//! Ordering of scored traders and aggregates over them.

mod consolidate;
mod portfolio;
mod ranker;

pub use consolidate::{aggregate_by_group, FieldStats, GroupKey, GroupSummary, SummaryStatistics, UNKNOWN_GROUP};
pub use portfolio::{
    aggregate_portfolio, Allocation, AllocationPlan, PortfolioAggregate, APPROVAL_THRESHOLD, MAX_ALLOCATION_PCT,
    MAX_SHORTLIST,
};
pub use ranker::{rank, RankedResult, Scored};
