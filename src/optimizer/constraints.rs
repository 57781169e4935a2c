use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Allowed gap between the rounded plan total and the demand, MW.
pub const DISPATCH_TOLERANCE_MW: f64 = 0.1;

/// Decimal places of the reported outputs.
pub const OUTPUT_DECIMALS: i32 = 1;

/// Slack used while comparing floors and ceilings during the search, MW.
pub const SEARCH_EPSILON_MW: f64 = 1e-6;

/// Per-call bounds on the commitment search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Maximum number of search nodes expanded before giving up
    pub max_nodes: usize,
    /// Wall-clock budget for a single solve
    pub time_budget: Duration,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_nodes: 1_000_000,
            time_budget: Duration::from_millis(250),
        }
    }
}

impl SearchLimits {
    pub fn new(max_nodes: usize, time_budget: Duration) -> Self {
        Self {
            max_nodes,
            time_budget,
        }
    }
}

/// Round to the reporting precision.
pub fn round_output(value: f64) -> f64 {
    let scale = 10f64.powi(OUTPUT_DECIMALS);
    (value * scale).round() / scale
}

/// Smallest reportable value at or above `min` and largest at or below `max`.
pub fn reportable_bounds(min: f64, max: f64) -> (f64, f64) {
    let scale = 10f64.powi(OUTPUT_DECIMALS);
    let slack = SEARCH_EPSILON_MW * scale;
    (
        (min * scale - slack).ceil() / scale,
        (max * scale + slack).floor() / scale,
    )
}

/// Round to the reporting precision without leaving `[min, max]`.
///
/// Half-up rounding that would cross a bound rounds inward instead. The
/// result can only leave the envelope when no reportable value lies inside it.
pub fn round_within(value: f64, min: f64, max: f64) -> f64 {
    let (low, high) = reportable_bounds(min, max);
    let rounded = round_output(value);
    if rounded > high && high >= low {
        high
    } else if rounded < low && low <= high {
        low
    } else {
        rounded
    }
}
