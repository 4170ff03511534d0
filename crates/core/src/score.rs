// crates/core/src/score.rs
//! Pure math for the job-satisfaction score (0-100).
//!
//! Six satisfaction levels are averaged using the user's importance weights,
//! then squashed through a logistic curve so that movement near either
//! extreme takes more weighted-average change than movement near the middle.

use crate::satisfaction::{Dimension, Dimensions};

/// Lower bound of a satisfaction level or importance weight.
pub const LEVEL_MIN: f64 = 0.0;
/// Upper bound of a satisfaction level or importance weight.
pub const LEVEL_MAX: f64 = 100.0;

// Logistic curve parameters: ceiling, steepness, midpoint.
const LOGISTIC_L: f64 = 100.0;
const LOGISTIC_K: f64 = 0.05;
const LOGISTIC_X0: f64 = 50.0;

/// Bound `value` to [0, 100]. NaN maps to 0.
pub fn clamp_level(value: f64) -> f64 {
    if value.is_nan() {
        return LEVEL_MIN;
    }
    value.clamp(LEVEL_MIN, LEVEL_MAX)
}

/// `L / (1 + e^(-k (x - x0)))` with L = 100, k = 0.05, x0 = 50.
pub fn logistic(x: f64) -> f64 {
    LOGISTIC_L / (1.0 + (-LOGISTIC_K * (x - LOGISTIC_X0)).exp())
}

/// Compute the composite score from six levels and six importance weights.
///
/// Returns exactly 0 when every importance is 0. Otherwise the result lies
/// strictly inside (0, 100).
pub fn weighted_score(levels: &Dimensions, importance: &Dimensions) -> f64 {
    let mut weighted_sum = 0.0;
    let mut importance_sum = 0.0;

    for d in Dimension::ALL {
        let w = importance.get(d) / 100.0;
        let s = levels.get(d) / 100.0;
        weighted_sum += w * s;
        importance_sum += w;
    }

    if importance_sum == 0.0 {
        return 0.0;
    }

    let weighted_average = weighted_sum / importance_sum * 100.0;
    logistic(weighted_average)
}
