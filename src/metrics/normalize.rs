//! Min-max normalization onto a 0-100 scale, and 2-decimal rounding for
//! reported values.

use serde::Serializer;

/// Score returned when the range is empty and carries no information.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Map `value` linearly from `[min, max]` onto `[0, 100]`.
///
/// Out-of-range values saturate at 0 or 100. With `reverse` the scale is
/// inverted for metrics where lower is better (drawdown). A degenerate range
/// (`min == max`) returns exactly 50.
pub fn normalize(value: f64, min: f64, max: f64, reverse: bool) -> f64 {
    if max == min {
        return NEUTRAL_SCORE;
    }

    let scaled = ((value - min) / (max - min) * 100.0).clamp(0.0, 100.0);

    if reverse {
        100.0 - scaled
    } else {
        scaled
    }
}

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn serialize_round2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round2(*value))
}

pub(crate) fn serialize_round2_opt<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_some(&round2(*v)),
        None => serializer.serialize_none(),
    }
}
