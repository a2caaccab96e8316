//! Ramer-Douglas-Peucker simplification.
//!
//! Points are placed on a plane with x in elapsed days since the first timestamp and y the
//! sample value. A present point is dropped when its perpendicular distance to the line
//! through the retained neighbours is within the tolerance. Missing points are never
//! candidates and are always kept, so gaps survive simplification.
//!
//! Long series are simplified in independent chunks (see [`crate::parallel`]). Chunk
//! endpoints are always retained, so the result near a chunk boundary may keep a few more
//! points than a single global pass would.

use tracing::debug;

use crate::common::time::elapsed_days;
use crate::common::types::SampleValue;
use crate::common::utils::perpendicular_distance;
use crate::config::{get_global_settings, AnalysisSettings};
use crate::error::{TsError, TsResult};
use crate::parallel::map_chunks;
use crate::series::TimeSeriesData;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReductionOptions {
    /// Series with this many points or fewer are returned unchanged.
    pub minimum_count: usize,
    /// Tolerance as a percentage of the value range, in `(0, 100]`.
    pub relative_tolerance: f64,
}

impl Default for ReductionOptions {
    fn default() -> Self {
        let settings = get_global_settings();
        Self {
            minimum_count: settings.reduction_minimum_count,
            relative_tolerance: settings.reduction_relative_tolerance,
        }
    }
}

impl ReductionOptions {
    pub fn new(minimum_count: usize, relative_tolerance: f64) -> Self {
        Self { minimum_count, relative_tolerance }
    }

    pub fn validate(&self) -> TsResult<()> {
        if self.minimum_count < 3 {
            return Err(TsError::InvalidArgument(format!(
                "minimum count must be at least 3, got {}",
                self.minimum_count
            )));
        }
        if !(self.relative_tolerance > 0.0 && self.relative_tolerance <= 100.0) {
            return Err(TsError::InvalidArgument(format!(
                "relative tolerance must be in (0, 100], got {}",
                self.relative_tolerance
            )));
        }
        Ok(())
    }
}

impl<T: SampleValue> TimeSeriesData<T> {
    /// Simplified copy of the series, keeping the original order of retained points.
    pub fn reduce(&self, options: &ReductionOptions) -> TsResult<TimeSeriesData<T>> {
        self.reduce_with_settings(options, get_global_settings())
    }

    pub fn reduce_with_settings(
        &self,
        options: &ReductionOptions,
        settings: &AnalysisSettings,
    ) -> TsResult<TimeSeriesData<T>> {
        options.validate()?;
        if self.is_empty() || self.len() <= options.minimum_count {
            return Ok(self.clone());
        }
        self.require_sorted()?;

        let (Some(min), Some(max)) = (self.minimum(), self.maximum()) else {
            // nothing but missing values
            return Ok(self.clone());
        };
        let tolerance = (max - min).abs().as_f64() * options.relative_tolerance / 100.0;

        let origin = self.timestamps[0];
        let xs: Vec<f64> = self.timestamps.iter().map(|ts| elapsed_days(origin, *ts)).collect();
        let ys: Vec<Option<f64>> = self.values.iter().map(|v| v.map(|v| v.as_f64())).collect();

        let retained = map_chunks(self.len(), settings, |range| {
            let keep = simplify(&xs[range.clone()], &ys[range.clone()], tolerance);
            range.zip(keep).filter_map(|(i, keep)| keep.then_some(i)).collect()
        });

        let mut res = TimeSeriesData::with_capacity(retained.len());
        for i in retained {
            res.append(self.timestamps[i], self.values[i]);
        }
        debug!(
            input = self.len(),
            output = res.len(),
            tolerance,
            "reduced series"
        );
        Ok(res)
    }
}

/// Marks the points of one chunk that survive simplification.
fn simplify(xs: &[f64], ys: &[Option<f64>], tolerance: f64) -> Vec<bool> {
    // missing values are kept unconditionally
    let mut keep: Vec<bool> = ys.iter().map(|v| v.is_none()).collect();

    let present: Vec<(usize, f64)> = ys
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();
    if present.len() <= 2 {
        for (i, _) in &present {
            keep[*i] = true;
        }
        return keep;
    }

    let last = present.len() - 1;
    keep[present[0].0] = true;
    keep[present[last].0] = true;

    let mut stack = vec![(0usize, last)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let (i1, y1) = present[start];
        let (i2, y2) = present[end];
        let (x1, x2) = (xs[i1], xs[i2]);

        let mut max_dist = 0.0;
        let mut max_pos = start;
        for (pos, (i0, y0)) in present.iter().enumerate().take(end).skip(start + 1) {
            let dist = perpendicular_distance(xs[*i0], *y0, x1, y1, x2, y2);
            if dist > max_dist {
                max_dist = dist;
                max_pos = pos;
            }
        }

        if max_dist > tolerance {
            keep[present[max_pos].0] = true;
            stack.push((start, max_pos));
            stack.push((max_pos, end));
        }
    }
    keep
}
