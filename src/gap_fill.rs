use chrono::Duration;
use tracing::debug;

use crate::common::time::{checked_add, validate_step};
use crate::common::types::{SampleValue, Timestamp};
use crate::error::{TsError, TsResult};
use crate::series::{DataPoint, TimeSeriesData, TimeSeriesDataType};

/// Outcome of [`TimeSeriesData::gap_fill_with_value`].
#[derive(Debug, Clone, PartialEq)]
pub struct GapFillResult<T> {
    pub series: TimeSeriesData<T>,
    /// Grid timestamps that had no point and received the fill value.
    pub inserted: usize,
    /// Grid timestamps that already had a point, left untouched.
    pub skipped: usize,
}

impl<T: SampleValue> TimeSeriesData<T> {
    /// Replaces missing values by interpolating between the nearest present neighbours.
    ///
    /// Missing values before the first or after the last present value have only one
    /// neighbour and stay missing.
    pub fn gap_fill(&self, data_type: TimeSeriesDataType) -> TsResult<TimeSeriesData<T>> {
        self.require_sorted()?;
        let mut res = self.clone();
        let mut prev: Option<usize> = None;
        let mut filled = 0;
        let mut i = 0;
        while i < self.len() {
            if self.values[i].is_some() {
                prev = Some(i);
                i += 1;
                continue;
            }
            // run of missing values: i..next
            let next = (i..self.len()).find(|&k| self.values[k].is_some());
            let run_end = next.unwrap_or(self.len());
            if let (Some(p), Some(n)) = (prev, next) {
                let p0 = DataPoint::new(self.timestamps[p], self.values[p]);
                let p1 = DataPoint::new(self.timestamps[n], self.values[n]);
                for k in i..run_end {
                    res.values[k] = Some(data_type.interpolate(&p0, &p1, self.timestamps[k])?);
                    filled += 1;
                }
            }
            i = run_end;
        }
        debug!(filled, %data_type, "gap filled missing values");
        Ok(res)
    }

    /// Inserts `value` on every `step` from `start` (inclusive) to `end` (exclusive) where
    /// the series has no point yet.
    pub fn gap_fill_with_value(
        &self,
        start: Timestamp,
        end: Timestamp,
        step: Duration,
        value: Option<T>,
    ) -> TsResult<GapFillResult<T>> {
        if end <= start {
            return Err(TsError::InvalidArgument(format!("end {end} must be after start {start}")));
        }
        validate_step(step)?;
        self.require_sorted()?;

        let mut series = self.clone();
        let mut inserted = 0;
        let mut skipped = 0;
        let mut t = start;
        while t < end {
            match series.timestamps.binary_search(&t) {
                Ok(_) => skipped += 1,
                Err(idx) => {
                    series.timestamps.insert(idx, t);
                    series.values.insert(idx, value);
                    inserted += 1;
                }
            }
            t = checked_add(t, step)?;
        }
        debug!(inserted, skipped, "gap filled with fixed value");
        Ok(GapFillResult { series, inserted, skipped })
    }
}
