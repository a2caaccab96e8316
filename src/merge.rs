use tracing::debug;

use crate::common::types::{SampleValue, Timestamp};
use crate::common::utils::ensure_ascending;
use crate::error::TsResult;
use crate::series::{TimeSeriesData, TimeSeriesDataWFlag};

/// Outcome of a merge. The patch series wins on equal timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult<S> {
    pub series: S,
    /// Points of `other` whose value was replaced by the patch.
    pub overwritten: usize,
    /// Patch points at timestamps `other` did not have.
    pub appended: usize,
}

struct MergeSource<'a, R> {
    timestamps: &'a [Timestamp],
    rows: &'a [R],
    next_idx: usize,
}

impl<'a, R: Clone> MergeSource<'a, R> {
    fn new(timestamps: &'a [Timestamp], rows: &'a [R]) -> Self {
        Self { timestamps, rows, next_idx: 0 }
    }

    fn peek(&self) -> Option<Timestamp> {
        self.timestamps.get(self.next_idx).copied()
    }

    fn take(&mut self) -> (Timestamp, R) {
        let res = (self.timestamps[self.next_idx], self.rows[self.next_idx].clone());
        self.next_idx += 1;
        res
    }
}

/// Sorted merge of two row sets. Rows of `patch` replace rows of `base` on equal timestamps.
fn merge_rows<R: Clone>(
    patch_timestamps: &[Timestamp],
    patch_rows: &[R],
    base_timestamps: &[Timestamp],
    base_rows: &[R],
) -> (Vec<Timestamp>, Vec<R>, usize, usize) {
    let mut patch = MergeSource::new(patch_timestamps, patch_rows);
    let mut base = MergeSource::new(base_timestamps, base_rows);
    let capacity = patch_timestamps.len() + base_timestamps.len();
    let mut timestamps = Vec::with_capacity(capacity);
    let mut rows = Vec::with_capacity(capacity);
    let mut overwritten = 0;
    let mut appended = 0;

    loop {
        let (ts, row) = match (patch.peek(), base.peek()) {
            (Some(p), Some(b)) if p == b => {
                base.take();
                overwritten += 1;
                patch.take()
            }
            (Some(p), Some(b)) if p < b => {
                appended += 1;
                patch.take()
            }
            (_, Some(_)) => base.take(),
            (Some(_), None) => {
                appended += 1;
                patch.take()
            }
            (None, None) => break,
        };
        timestamps.push(ts);
        rows.push(row);
    }
    (timestamps, rows, overwritten, appended)
}

impl<T: SampleValue> TimeSeriesData<T> {
    /// Applies this series as a patch onto `other`.
    ///
    /// Where `other` already has a point at the same timestamp its value is overwritten,
    /// otherwise the patch point is added. Both inputs must be sorted.
    pub fn merge_with(&self, other: &TimeSeriesData<T>) -> TsResult<MergeResult<TimeSeriesData<T>>> {
        self.require_sorted()?;
        other.require_sorted()?;
        let (timestamps, values, overwritten, appended) =
            merge_rows(&self.timestamps, &self.values, &other.timestamps, &other.values);
        debug!(overwritten, appended, "merged series");
        Ok(MergeResult {
            series: TimeSeriesData { timestamps, values },
            overwritten,
            appended,
        })
    }
}

impl<T: SampleValue, F: Clone> TimeSeriesDataWFlag<T, F> {
    /// Like [`TimeSeriesData::merge_with`], overwriting both value and flag.
    pub fn merge_with(&self, other: &TimeSeriesDataWFlag<T, F>) -> TsResult<MergeResult<TimeSeriesDataWFlag<T, F>>> {
        ensure_ascending(&self.timestamps)?;
        ensure_ascending(&other.timestamps)?;
        let patch_rows: Vec<(Option<T>, Option<F>)> =
            self.values.iter().copied().zip(self.flags.iter().cloned()).collect();
        let base_rows: Vec<(Option<T>, Option<F>)> =
            other.values.iter().copied().zip(other.flags.iter().cloned()).collect();
        let (timestamps, rows, overwritten, appended) =
            merge_rows(&self.timestamps, &patch_rows, &other.timestamps, &base_rows);
        let (values, flags) = rows.into_iter().unzip();
        debug!(overwritten, appended, "merged flagged series");
        Ok(MergeResult {
            series: TimeSeriesDataWFlag { timestamps, values, flags },
            overwritten,
            appended,
        })
    }
}
