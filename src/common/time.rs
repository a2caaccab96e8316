use std::fmt::Display;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::common::types::Timestamp;
use crate::error::{TsError, TsResult};

pub const SECONDS_PER_HOUR: f64 = 60.0 * 60.0;
pub const SECONDS_PER_DAY: f64 = 24.0 * SECONDS_PER_HOUR;

/// Length of `d` in fractional seconds, keeping sub-millisecond precision.
/// Spans too long for a nanosecond count fall back to milliseconds.
#[inline]
pub fn duration_seconds(d: Duration) -> f64 {
    match d.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        None => d.num_milliseconds() as f64 / 1e3,
    }
}

/// Fractional number of days from `from` to `to`.
#[inline]
pub fn elapsed_days(from: Timestamp, to: Timestamp) -> f64 {
    duration_seconds(to - from) / SECONDS_PER_DAY
}

/// Fractional number of hours from `from` to `to`.
#[inline]
pub fn elapsed_hours(from: Timestamp, to: Timestamp) -> f64 {
    duration_seconds(to - from) / SECONDS_PER_HOUR
}

pub(crate) fn validate_step(step: Duration) -> TsResult<()> {
    if step <= Duration::zero() {
        return Err(TsError::InvalidDuration(format!(
            "time span must be positive, got {} s",
            duration_seconds(step)
        )));
    }
    Ok(())
}

pub(crate) fn checked_add(ts: Timestamp, step: Duration) -> TsResult<Timestamp> {
    ts.checked_add_signed(step)
        .ok_or_else(|| TsError::InvalidTimestamp(format!("{ts} + {} s overflows", duration_seconds(step))))
}

/// Calendar-aligned granularity used for grouping and resampling.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Period {
    Hourly,
    #[default]
    Daily,
    /// ISO weeks, starting on Monday.
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Hourly => "hourly",
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Quarterly => "quarterly",
            Period::Yearly => "yearly",
        }
    }

    /// Start of the period that contains `ts`.
    pub fn start_of(&self, ts: Timestamp) -> Timestamp {
        let date = ts.date();
        match self {
            Period::Hourly => {
                let hour = NaiveTime::from_hms_opt(ts.hour(), 0, 0).unwrap_or(NaiveTime::MIN);
                date.and_time(hour)
            }
            Period::Daily => date.and_time(NaiveTime::MIN),
            Period::Weekly => {
                let days_from_monday = date.weekday().num_days_from_monday() as i64;
                (date - Duration::days(days_from_monday)).and_time(NaiveTime::MIN)
            }
            Period::Monthly => date.with_day(1).unwrap_or(date).and_time(NaiveTime::MIN),
            Period::Quarterly => {
                let month = (date.month0() / 3) * 3 + 1;
                date.with_day(1)
                    .and_then(|d| d.with_month(month))
                    .unwrap_or(date)
                    .and_time(NaiveTime::MIN)
            }
            Period::Yearly => date.with_ordinal(1).unwrap_or(date).and_time(NaiveTime::MIN),
        }
    }

    /// Advances `ts` by one period. `ts` is expected to be period aligned.
    pub fn next(&self, ts: Timestamp) -> TsResult<Timestamp> {
        let res = match self {
            Period::Hourly => ts.checked_add_signed(Duration::hours(1)),
            Period::Daily => ts.checked_add_signed(Duration::days(1)),
            Period::Weekly => ts.checked_add_signed(Duration::weeks(1)),
            Period::Monthly => ts.checked_add_months(Months::new(1)),
            Period::Quarterly => ts.checked_add_months(Months::new(3)),
            Period::Yearly => ts.checked_add_months(Months::new(12)),
        };
        res.ok_or_else(|| TsError::InvalidTimestamp(format!("cannot advance {ts} by one {} period", self)))
    }

    /// Moves `ts` back by one period. `ts` is expected to be period aligned.
    pub fn previous(&self, ts: Timestamp) -> TsResult<Timestamp> {
        let res = match self {
            Period::Hourly => ts.checked_sub_signed(Duration::hours(1)),
            Period::Daily => ts.checked_sub_signed(Duration::days(1)),
            Period::Weekly => ts.checked_sub_signed(Duration::weeks(1)),
            Period::Monthly => ts.checked_sub_months(Months::new(1)),
            Period::Quarterly => ts.checked_sub_months(Months::new(3)),
            Period::Yearly => ts.checked_sub_months(Months::new(12)),
        };
        res.ok_or_else(|| TsError::InvalidTimestamp(format!("cannot move {ts} back by one {} period", self)))
    }

    /// First period boundary at or after `ts`.
    pub fn ceil(&self, ts: Timestamp) -> TsResult<Timestamp> {
        let start = self.start_of(ts);
        if start == ts {
            Ok(start)
        } else {
            self.next(start)
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Period {
    type Err = TsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            s if s.eq_ignore_ascii_case("hourly") => Ok(Period::Hourly),
            s if s.eq_ignore_ascii_case("daily") => Ok(Period::Daily),
            s if s.eq_ignore_ascii_case("weekly") => Ok(Period::Weekly),
            s if s.eq_ignore_ascii_case("monthly") => Ok(Period::Monthly),
            s if s.eq_ignore_ascii_case("quarterly") => Ok(Period::Quarterly),
            s if s.eq_ignore_ascii_case("yearly") => Ok(Period::Yearly),
            _ => Err(TsError::InvalidArgument(format!("invalid period: {s}"))),
        }
    }
}
