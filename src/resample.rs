use chrono::Duration;
use tracing::debug;

use crate::aggregation::{AggregationType, Aggregator};
use crate::common::time::{checked_add, duration_seconds, validate_step, Period};
use crate::common::types::{SampleValue, Timestamp};
use crate::error::{TsError, TsResult};
use crate::series::{DataPoint, TimeSeriesData, TimeSeriesDataType};

impl<T: SampleValue> TimeSeriesData<T> {
    /// Resamples onto an equidistant grid starting at the first timestamp.
    ///
    /// Grid values are interpolated under `data_type`, except for `StepAccumulated` where
    /// each grid point holds the sum of the samples in `[t - step, t)` and the grid is
    /// extended by one point past the end so the last samples are accounted for.
    pub fn resample(&self, step: Duration, data_type: TimeSeriesDataType) -> TsResult<TimeSeriesData<T>> {
        validate_step(step)?;
        let (first, last) = self.resample_bounds(data_type)?;
        let span = last - first;
        if step > span {
            return Err(TsError::InvalidArgument(format!(
                "time span of {} s exceeds the series span of {} s",
                duration_seconds(step),
                duration_seconds(span)
            )));
        }

        let mut grid = Vec::new();
        let mut t = first;
        while t <= last {
            grid.push(t);
            t = checked_add(t, step)?;
        }

        if data_type == TimeSeriesDataType::StepAccumulated {
            grid.push(t);
            let starts = grid.iter().map(|t| *t - step).collect::<Vec<_>>();
            Ok(self.sum_windows(&grid, &starts))
        } else {
            self.interpolate_grid(&grid, data_type)
        }
    }

    /// Resamples onto calendar period boundaries between the first and last timestamp.
    pub fn resample_by_period(&self, period: Period, data_type: TimeSeriesDataType) -> TsResult<TimeSeriesData<T>> {
        let (first, last) = self.resample_bounds(data_type)?;
        let period_start = period.start_of(first);
        let nominal = period.next(period_start)? - period_start;
        if nominal > last - first {
            return Err(TsError::InvalidArgument(format!(
                "{period} period exceeds the series span"
            )));
        }

        let mut grid = Vec::new();
        let mut t = period.ceil(first)?;
        while t <= last {
            grid.push(t);
            t = period.next(t)?;
        }

        if data_type == TimeSeriesDataType::StepAccumulated {
            grid.push(t);
            let mut starts = Vec::with_capacity(grid.len());
            starts.push(period.previous(grid[0])?);
            starts.extend_from_slice(&grid[..grid.len() - 1]);
            Ok(self.sum_windows(&grid, &starts))
        } else {
            self.interpolate_grid(&grid, data_type)
        }
    }

    fn resample_bounds(&self, data_type: TimeSeriesDataType) -> TsResult<(Timestamp, Timestamp)> {
        self.require_sorted()?;
        if self.len() < 2 {
            return Err(TsError::InsufficientData { required: 2, found: self.len() });
        }
        let (first, last) = (self.timestamps[0], self.timestamps[self.len() - 1]);
        if data_type != TimeSeriesDataType::StepAccumulated {
            if self.values[0].is_none() {
                return Err(TsError::MissingValue(format!("first value at {first} is missing")));
            }
            if self.values[self.len() - 1].is_none() {
                return Err(TsError::MissingValue(format!("last value at {last} is missing")));
            }
        }
        Ok((first, last))
    }

    /// Grid values via interpolation. Points between a missing neighbour stay missing.
    fn interpolate_grid(&self, grid: &[Timestamp], data_type: TimeSeriesDataType) -> TsResult<TimeSeriesData<T>> {
        let mut res = TimeSeriesData::with_capacity(grid.len());
        let mut j = 0;
        for &t in grid {
            while j < self.len() && self.timestamps[j] < t {
                j += 1;
            }
            if j < self.len() && self.timestamps[j] == t {
                res.append(t, self.values[j]);
                continue;
            }
            // grid lies within [first, last] and first is an exact hit, so 0 < j < len
            let p0 = DataPoint::new(self.timestamps[j - 1], self.values[j - 1]);
            let p1 = DataPoint::new(self.timestamps[j], self.values[j]);
            let value = if p0.is_missing() || p1.is_missing() {
                None
            } else {
                Some(data_type.interpolate(&p0, &p1, t)?)
            };
            res.append(t, value);
        }
        debug!(points = res.len(), %data_type, "resampled series");
        Ok(res)
    }

    /// Sum of the samples in `[starts[i], grid[i])` for every grid point.
    fn sum_windows(&self, grid: &[Timestamp], starts: &[Timestamp]) -> TimeSeriesData<T> {
        let mut res = TimeSeriesData::with_capacity(grid.len());
        let mut aggregator = Aggregator::new(AggregationType::Sum);
        let mut lo = 0;
        for (&t, &start) in grid.iter().zip(starts) {
            while lo < self.len() && self.timestamps[lo] < start {
                lo += 1;
            }
            let mut hi = lo;
            aggregator.reset();
            while hi < self.len() && self.timestamps[hi] < t {
                aggregator.update(self.values[hi]);
                hi += 1;
            }
            res.append(t, aggregator.finalize());
        }
        debug!(points = res.len(), "resampled step accumulated series");
        res
    }
}
