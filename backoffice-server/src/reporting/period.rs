//! Period Resolver
//!
//! Turns a named filter plus a reference date into a concrete
//! inclusive date interval, and derives the equivalent prior interval
//! for comparison. `week` and `month` are to-date windows (Monday or
//! the 1st through the reference date), not full calendar periods; the
//! prior window always has the same span.

use chrono::{Datelike, Duration, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::error::{ReportError, ReportResult};
use super::facts::TimeRange;
use crate::utils::time;

/// Named report period filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodFilter {
    Today,
    Week,
    Month,
    Custom,
}

impl PeriodFilter {
    /// Parse a filter name. Unrecognized values degrade to `Today`,
    /// matching the legacy behavior; the fallback is logged so caller
    /// typos stay visible.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw {
            "today" => Self::Today,
            "week" => Self::Week,
            "month" => Self::Month,
            "custom" => Self::Custom,
            other => {
                tracing::warn!(filter = %other, "Unknown period filter, falling back to 'today'");
                Self::Today
            }
        }
    }

    /// Caption for the prior-period comparison line
    pub fn comparison_caption(&self) -> &'static str {
        match self {
            Self::Today => "vs yesterday",
            Self::Week => "vs last week",
            Self::Month => "vs last month",
            Self::Custom => "vs previous period",
        }
    }
}

/// Concrete date interval, inclusive on both ends.
///
/// Invariant: `start <= end`. Time-of-day bounds (00:00:00 through end
/// of day) are applied only when converting to a UTC query range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub filter: PeriodFilter,
}

impl PeriodWindow {
    /// Convert to a half-open UTC millis range for fact-source queries.
    /// Local-day boundaries in `tz`, end exclusive.
    pub fn to_utc_range(&self, tz: Tz) -> TimeRange {
        TimeRange {
            start_millis: time::day_start_millis(self.start, tz),
            end_millis: time::day_end_millis(self.end, tz),
        }
    }

    /// Number of calendar days covered (>= 1)
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Resolve the current reporting window for `filter` relative to `today`.
///
/// `date_from`/`date_to` are required (ISO `YYYY-MM-DD`) only for
/// `Custom`; malformed or reversed bounds are an error, never a silent
/// fallback.
pub fn resolve(
    filter: PeriodFilter,
    date_from: Option<&str>,
    date_to: Option<&str>,
    today: NaiveDate,
) -> ReportResult<PeriodWindow> {
    let (start, end) = match filter {
        PeriodFilter::Today => (today, today),
        PeriodFilter::Week => {
            let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
            (monday, today)
        }
        PeriodFilter::Month => {
            let first = today.with_day(1).unwrap_or(today);
            (first, today)
        }
        PeriodFilter::Custom => {
            let (from, to) = match (date_from, date_to) {
                (Some(f), Some(t)) => (f, t),
                _ => {
                    return Err(ReportError::InvalidDateRange(
                        "Custom period requires both date_from and date_to".to_string(),
                    ));
                }
            };
            let start = parse_bound(from)?;
            let end = parse_bound(to)?;
            if start > end {
                return Err(ReportError::InvalidDateRange(format!(
                    "date_from {} is after date_to {}",
                    start, end
                )));
            }
            (start, end)
        }
    };

    Ok(PeriodWindow { start, end, filter })
}

/// Derive the immediately preceding same-length window.
pub fn previous(window: &PeriodWindow) -> PeriodWindow {
    let (start, end) = match window.filter {
        // Yesterday
        PeriodFilter::Today => (
            window.start - Duration::days(1),
            window.end - Duration::days(1),
        ),
        // Same weekday offsets, one week back
        PeriodFilter::Week => (
            window.start - Duration::days(7),
            window.end - Duration::days(7),
        ),
        // Same day-count span ending the day before the current start
        PeriodFilter::Month | PeriodFilter::Custom => {
            let span = (window.end - window.start).num_days();
            let prev_end = window.start - Duration::days(1);
            (prev_end - Duration::days(span), prev_end)
        }
    };

    PeriodWindow {
        start,
        end,
        filter: window.filter,
    }
}

fn parse_bound(raw: &str) -> ReportResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ReportError::InvalidDateRange(format!("Invalid date: {}", raw)))
}
