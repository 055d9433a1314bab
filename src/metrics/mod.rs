//! Derived-metric calculation and score normalization.

mod calculator;
pub mod normalize;

pub use calculator::{MetricsCalculator, SlippageEstimate, NEUTRAL_CONSISTENCY};
pub use normalize::{normalize, round2, NEUTRAL_SCORE};
