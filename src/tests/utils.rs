use chrono::{Duration, NaiveDate};

use crate::common::types::Timestamp;
use crate::series::TimeSeriesData;

pub fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Timestamp {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("valid test timestamp")
}

/// Hours relative to 2000-01-01T00:00.
pub fn hours_from_epoch(hours: i64) -> Timestamp {
    ts(2000, 1, 1, 0, 0) + Duration::hours(hours)
}

/// Series with one sample per hour starting at `hours_from_epoch(0)`.
pub fn hourly_series(values: &[Option<f64>]) -> TimeSeriesData<f64> {
    let timestamps = (0..values.len() as i64).map(hours_from_epoch).collect();
    TimeSeriesData::from_vecs(timestamps, values.to_vec()).expect("equal lengths")
}

pub fn series_from_hours(points: &[(i64, Option<f64>)]) -> TimeSeriesData<f64> {
    let timestamps = points.iter().map(|(h, _)| hours_from_epoch(*h)).collect();
    let values = points.iter().map(|(_, v)| *v).collect();
    TimeSeriesData::from_vecs(timestamps, values).expect("equal lengths")
}

pub fn assert_close(actual: f64, expected: f64, eps: f64) {
    assert!(
        (actual - expected).abs() <= eps,
        "expected {expected}, got {actual} (eps {eps})"
    );
}
