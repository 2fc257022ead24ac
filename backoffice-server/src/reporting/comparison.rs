//! Period Comparator
//!
//! Percentage change between a current-period aggregate and the prior
//! one. The zero-baseline convention is deliberately asymmetric (any
//! growth from zero reads as a flat +100%, never infinite); tests
//! depend on it, keep it exact.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

/// Output of [`compare`]; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    /// Absolute percentage change (always >= 0)
    pub percentage: f64,
    pub trend: Trend,
    /// '+', '-' or empty, mirroring the trend
    pub sign: &'static str,
    /// Signed one-decimal rendering, e.g. "+12.5%"
    pub formatted: String,
}

/// Compare a current aggregate against the prior-period one.
pub fn compare(current: f64, previous: f64) -> ComparisonResult {
    if previous == 0.0 {
        return if current > 0.0 {
            ComparisonResult {
                percentage: 100.0,
                trend: Trend::Up,
                sign: "+",
                formatted: "+100.0%".to_string(),
            }
        } else {
            ComparisonResult {
                percentage: 0.0,
                trend: Trend::Neutral,
                sign: "",
                formatted: "0.0%".to_string(),
            }
        };
    }

    let change = (current - previous) / previous * 100.0;
    let (trend, sign) = if change > 0.0 {
        (Trend::Up, "+")
    } else if change < 0.0 {
        (Trend::Down, "-")
    } else {
        (Trend::Neutral, "")
    };

    ComparisonResult {
        percentage: change.abs(),
        trend,
        sign,
        formatted: format!("{}{:.1}%", if change > 0.0 { "+" } else { "" }, change),
    }
}
