//! Duration curves: how much of the time a series stays at or below a given value.

use tracing::debug;

use crate::common::time::{duration_seconds, elapsed_hours, SECONDS_PER_HOUR};
use crate::common::types::{SampleValue, Timestamp};
use crate::config::get_global_settings;
use crate::error::{TsError, TsResult};
use crate::series::TimeSeriesData;

/// Non-exceedance probabilities evaluated by [`TimeSeriesData::extreme_duration_curve`].
pub const EXTREME_PROBABILITIES: [f64; 21] = [
    0.0, 0.0001, 0.001, 0.01, 0.02, 0.05, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 0.95,
    0.98, 0.99, 0.999, 0.9999, 0.99999,
];

/// Share of the value range added below the minimum and above the maximum.
const RANGE_PADDING: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationCurveOptions {
    /// Time is counted in whole blocks of this many hours.
    pub duration_in_hours: u32,
    pub number_of_intervals: usize,
    pub min_number_of_values: usize,
}

impl Default for DurationCurveOptions {
    fn default() -> Self {
        Self {
            duration_in_hours: 24,
            number_of_intervals: 10,
            min_number_of_values: get_global_settings().duration_curve_min_values,
        }
    }
}

impl DurationCurveOptions {
    pub fn new(duration_in_hours: u32, number_of_intervals: usize) -> Self {
        Self {
            duration_in_hours,
            number_of_intervals,
            ..Default::default()
        }
    }

    pub fn with_min_number_of_values(mut self, min_number_of_values: usize) -> Self {
        self.min_number_of_values = min_number_of_values;
        self
    }

    pub fn validate(&self) -> TsResult<()> {
        if self.duration_in_hours == 0 {
            return Err(TsError::InvalidDuration("duration in hours must be positive".to_string()));
        }
        if self.number_of_intervals < 2 {
            return Err(TsError::InvalidArgument(format!(
                "number of intervals must be at least 2, got {}",
                self.number_of_intervals
            )));
        }
        Ok(())
    }
}

/// Tracks, per interval, since when the value has been at or above its lower bound.
struct IntervalWindows {
    active_since: Vec<Option<Timestamp>>,
    blocks: Vec<u64>,
    duration_hours: f64,
}

impl IntervalWindows {
    fn new(intervals: usize, duration_hours: f64) -> Self {
        Self {
            active_since: vec![None; intervals],
            blocks: vec![0; intervals],
            duration_hours,
        }
    }

    /// Activates every window up to and including `interval` and closes the ones above it.
    fn update(&mut self, interval: usize, ts: Timestamp) {
        for k in 0..self.active_since.len() {
            if k <= interval {
                self.active_since[k].get_or_insert(ts);
            } else {
                self.close(k, ts);
            }
        }
    }

    fn close(&mut self, k: usize, ts: Timestamp) {
        if let Some(since) = self.active_since[k].take() {
            let hours = elapsed_hours(since, ts);
            self.blocks[k] += (hours / self.duration_hours).floor() as u64;
        }
    }

    fn close_all(&mut self, ts: Timestamp) {
        for k in 0..self.active_since.len() {
            self.close(k, ts);
        }
    }
}

impl<T: SampleValue> TimeSeriesData<T> {
    /// Returns `(lower_bound, fraction)` pairs in ascending order of the bound, where
    /// `fraction` is the share of the series' time span during which the value stayed
    /// below that bound.
    ///
    /// The padded value range is split into `number_of_intervals` equal intervals. The
    /// lowest bound lies below every value and is left out, so the result has
    /// `number_of_intervals - 1` entries.
    pub fn duration_curve(&self, options: &DurationCurveOptions) -> TsResult<Vec<(T, f64)>> {
        options.validate()?;
        let found = self.present_count();
        if found < options.min_number_of_values || found < 2 {
            return Err(TsError::InsufficientData {
                required: options.min_number_of_values.max(2),
                found,
            });
        }
        self.require_sorted()?;

        let (Some(min), Some(max)) = (self.minimum(), self.maximum()) else {
            return Err(TsError::EmptyValueRange);
        };
        let (min, max) = (min.as_f64(), max.as_f64());
        let range = max - min;
        if !(range > 0.0) {
            return Err(TsError::EmptyValueRange);
        }

        let n = options.number_of_intervals;
        let lower = min - range * RANGE_PADDING;
        let width = (range * (1.0 + 2.0 * RANGE_PADDING)) / n as f64;
        let interval_of = |v: f64| (((v - lower) / width).floor().max(0.0) as usize).min(n - 1);

        let mut windows = IntervalWindows::new(n, options.duration_in_hours as f64);
        let mut current: Option<usize> = None;
        let mut last_ts = None;
        for point in self.iter() {
            let Some(value) = point.value else { continue };
            last_ts = Some(point.timestamp);
            let interval = interval_of(value.as_f64());
            if current != Some(interval) {
                windows.update(interval, point.timestamp);
                current = Some(interval);
            }
        }
        let Some(last_ts) = last_ts else {
            return Err(TsError::EmptyValueRange);
        };
        // windows end at the last observed value, fractions are relative to the whole series
        windows.close_all(last_ts);

        let total_hours = duration_seconds(self.time_span()) / SECONDS_PER_HOUR;
        if !(total_hours > 0.0) {
            return Err(TsError::InvalidArgument("series covers no time".to_string()));
        }
        let res: Vec<(T, f64)> = (1..n)
            .map(|k| {
                let bound = lower + width * k as f64;
                let covered = windows.blocks[k] as f64 * options.duration_in_hours as f64;
                let fraction = (1.0 - covered / total_hours).clamp(0.0, 1.0);
                (T::from_f64_lossy(bound), fraction)
            })
            .collect();

        debug!(values = found, intervals = n, total_hours, "computed duration curve");
        Ok(res)
    }

    /// Value at each of the [`EXTREME_PROBABILITIES`], taken by rank from the sorted present
    /// values. Returns `(probability, value)` pairs.
    pub fn extreme_duration_curve(&self) -> TsResult<Vec<(f64, T)>> {
        let mut values: Vec<T> = self.present_values().collect();
        if values.is_empty() {
            return Err(TsError::InsufficientData { required: 1, found: 0 });
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let n = values.len();
        Ok(EXTREME_PROBABILITIES
            .iter()
            .map(|p| {
                let idx = ((p * n as f64).floor() as usize).min(n - 1);
                (*p, values[idx])
            })
            .collect())
    }
}
