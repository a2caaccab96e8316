use std::collections::BTreeSet;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::common::types::{SampleValue, Timestamp};
use crate::common::utils::{ensure_ascending, get_timestamp_index, get_timestamp_index_bounds};
use crate::error::{TsError, TsResult};
use crate::series::{ByTimestamp, DataPoint, DuplicatePolicy};

/// A sparse signal stored as two parallel, equal-length buffers.
///
/// Most operations assume ascending timestamps. `append` trusts the caller's ordering;
/// `insert` keeps the buffers sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeriesDataParts<T>")]
pub struct TimeSeriesData<T> {
    pub(crate) timestamps: Vec<Timestamp>,
    pub(crate) values: Vec<Option<T>>,
}

/// Unchecked wire form, validated on the way into [`TimeSeriesData`].
#[derive(Deserialize)]
struct SeriesDataParts<T> {
    timestamps: Vec<Timestamp>,
    values: Vec<Option<T>>,
}

impl<T> TryFrom<SeriesDataParts<T>> for TimeSeriesData<T> {
    type Error = TsError;

    fn try_from(parts: SeriesDataParts<T>) -> Result<Self, Self::Error> {
        let SeriesDataParts { timestamps, values } = parts;
        if timestamps.len() != values.len() {
            return Err(TsError::InvalidSize(timestamps.len(), values.len()));
        }
        Ok(Self { timestamps, values })
    }
}

impl<T> Default for TimeSeriesData<T> {
    fn default() -> Self {
        Self { timestamps: vec![], values: vec![] }
    }
}

impl<T: SampleValue> TimeSeriesData<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            timestamps: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn from_vecs(timestamps: Vec<Timestamp>, values: Vec<Option<T>>) -> TsResult<Self> {
        if timestamps.len() != values.len() {
            return Err(TsError::InvalidSize(timestamps.len(), values.len()));
        }
        Ok(Self { timestamps, values })
    }

    /// Builds a sorted series from points in any order, resolving equal timestamps with `policy`.
    pub fn from_points<I>(points: I, policy: DuplicatePolicy) -> TsResult<Self>
    where
        I: IntoIterator<Item = DataPoint<T>>,
    {
        let mut points: Vec<DataPoint<T>> = points.into_iter().collect();
        // stable, so KeepFirst/KeepLast refer to input order
        points.sort_by_key(|p| p.timestamp);

        let mut res = Self::with_capacity(points.len());
        for point in points {
            match res.timestamps.last() {
                Some(last) if *last == point.timestamp => {
                    let idx = res.values.len() - 1;
                    res.values[idx] = policy.value_on_duplicate(point.timestamp, res.values[idx], point.value)?;
                }
                _ => res.append(point.timestamp, point.value),
            }
        }
        Ok(res)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn values(&self) -> &[Option<T>] {
        &self.values
    }

    pub fn into_parts(self) -> (Vec<Timestamp>, Vec<Option<T>>) {
        (self.timestamps, self.values)
    }

    /// Adds a point at the end without checking the ordering.
    pub fn append(&mut self, ts: Timestamp, value: Option<T>) {
        self.timestamps.push(ts);
        self.values.push(value);
    }

    /// Inserts a point at its sorted position. Returns the number of points added:
    /// 0 when `ts` was already present and `policy` (default `KeepLast`) resolved the clash.
    pub fn insert(&mut self, ts: Timestamp, value: Option<T>, policy: Option<DuplicatePolicy>) -> TsResult<usize> {
        match self.timestamps.binary_search(&ts) {
            Ok(pos) => {
                let dp = policy.unwrap_or(DuplicatePolicy::KeepLast);
                self.values[pos] = dp.value_on_duplicate(ts, self.values[pos], value)?;
                Ok(0)
            }
            Err(idx) => {
                self.timestamps.insert(idx, ts);
                self.values.insert(idx, value);
                Ok(1)
            }
        }
    }

    pub fn truncate(&mut self, len: usize) {
        self.timestamps.truncate(len);
        self.values.truncate(len);
    }

    pub fn clear(&mut self) {
        self.timestamps.clear();
        self.values.clear();
    }

    pub fn get(&self, index: usize) -> Option<DataPoint<T>> {
        let timestamp = *self.timestamps.get(index)?;
        Some(DataPoint::new(timestamp, self.values[index]))
    }

    pub fn first(&self) -> Option<DataPoint<T>> {
        self.get(0)
    }

    pub fn last(&self) -> Option<DataPoint<T>> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// First point holding a value.
    pub fn first_value_point(&self) -> Option<DataPoint<T>> {
        let idx = self.values.iter().position(Option::is_some)?;
        self.get(idx)
    }

    /// Last point holding a value.
    pub fn last_value_point(&self) -> Option<DataPoint<T>> {
        let idx = self.values.iter().rposition(Option::is_some)?;
        self.get(idx)
    }

    /// Value stored at exactly `ts`. The outer `None` means there is no point at `ts`.
    pub fn value_at(&self, ts: Timestamp) -> Option<Option<T>> {
        self.timestamps.binary_search(&ts).ok().map(|i| self.values[i])
    }

    /// First point strictly after `ts`.
    pub fn first_after(&self, ts: Timestamp) -> Option<DataPoint<T>> {
        let idx = self.timestamps.partition_point(|t| *t <= ts);
        self.get(idx)
    }

    /// Last point strictly before `ts`.
    pub fn last_before(&self, ts: Timestamp) -> Option<DataPoint<T>> {
        let idx = self.timestamps.partition_point(|t| *t < ts);
        idx.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Points within `from..=to`.
    pub fn range(&self, from: Timestamp, to: Timestamp) -> Self {
        match get_timestamp_index_bounds(&self.timestamps, from, to) {
            Some((start, end)) => Self {
                timestamps: self.timestamps[start..end].to_vec(),
                values: self.values[start..end].to_vec(),
            },
            None => Self::new(),
        }
    }

    /// Points from `from` (inclusive) to the end of the series.
    pub fn tail_from(&self, from: Timestamp) -> Self {
        match get_timestamp_index(&self.timestamps, from) {
            Some(start) => Self {
                timestamps: self.timestamps[start..].to_vec(),
                values: self.values[start..].to_vec(),
            },
            None => Self::new(),
        }
    }

    /// Distance between the first and last timestamp.
    pub fn time_span(&self) -> Duration {
        match (self.timestamps.first(), self.timestamps.last()) {
            (Some(first), Some(last)) => *last - *first,
            _ => Duration::zero(),
        }
    }

    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn present_values(&self) -> impl Iterator<Item = T> + '_ {
        self.values.iter().filter_map(|v| *v)
    }

    pub fn iter(&self) -> SeriesDataIter<'_, T> {
        SeriesDataIter::new(self)
    }

    /// Timestamp-keyed set view. Only one point per timestamp survives (the first).
    pub fn to_sorted_set(&self) -> BTreeSet<ByTimestamp<T>> {
        self.iter().map(ByTimestamp).collect()
    }

    pub(crate) fn require_sorted(&self) -> TsResult<()> {
        ensure_ascending(&self.timestamps)
    }
}

impl<T: SampleValue> FromIterator<DataPoint<T>> for TimeSeriesData<T> {
    /// Collects points in iteration order, like repeated `append`.
    fn from_iter<I: IntoIterator<Item = DataPoint<T>>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut res = Self::with_capacity(iter.size_hint().0);
        for point in iter {
            res.append(point.timestamp, point.value);
        }
        res
    }
}

pub struct SeriesDataIter<'a, T> {
    series: &'a TimeSeriesData<T>,
    idx: usize,
}

impl<'a, T> SeriesDataIter<'a, T> {
    pub fn new(series: &'a TimeSeriesData<T>) -> Self {
        Self { series, idx: 0 }
    }
}

impl<T: Copy> Iterator for SeriesDataIter<'_, T> {
    type Item = DataPoint<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= self.series.timestamps.len() {
            return None;
        }
        let res = Some(DataPoint {
            timestamp: self.series.timestamps[self.idx],
            value: self.series.values[self.idx],
        });
        self.idx += 1;
        res
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.series.timestamps.len() - self.idx;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::{hourly_series, hours_from_epoch};

    #[test]
    fn from_vecs_rejects_length_mismatch() {
        let res = TimeSeriesData::<f64>::from_vecs(vec![hours_from_epoch(0)], vec![]);
        assert_eq!(res, Err(TsError::InvalidSize(1, 0)));
    }

    #[test]
    fn deserialize_checks_lengths() {
        let json = r#"{"timestamps":["2024-01-01T00:00:00","2024-01-01T01:00:00"],"values":[1.0]}"#;
        let err = serde_json::from_str::<TimeSeriesData<f64>>(json).unwrap_err();
        assert!(err.to_string().contains("Invalid size"), "{err}");

        let json = r#"{"timestamps":["2024-01-01T00:00:00","2024-01-01T01:00:00"],"values":[1.0,null]}"#;
        let series: TimeSeriesData<f64> = serde_json::from_str(json).unwrap();
        assert_eq!(series.values(), &[Some(1.0), None]);
        assert_eq!(serde_json::from_str::<TimeSeriesData<f64>>(&serde_json::to_string(&series).unwrap()).unwrap(), series);
    }

    #[test]
    fn truncate_and_clear() {
        let mut series = hourly_series(&[Some(0.0), None, Some(2.0), Some(3.0)]);
        series.truncate(2);
        assert_eq!(series.timestamps(), &[hours_from_epoch(0), hours_from_epoch(1)]);
        assert_eq!(series.values(), &[Some(0.0), None]);
        series.truncate(10);
        assert_eq!(series.len(), 2);

        series.clear();
        assert!(series.is_empty());
        assert!(series.values().is_empty());
        assert_eq!(series, TimeSeriesData::new());
    }

    #[test]
    fn from_points_sorts_and_keeps_first_duplicate() {
        let points = vec![
            DataPoint::new(hours_from_epoch(3), Some(3.0)),
            DataPoint::new(hours_from_epoch(1), Some(1.0)),
            DataPoint::new(hours_from_epoch(3), Some(30.0)),
        ];
        let series = TimeSeriesData::from_points(points.clone(), DuplicatePolicy::KeepFirst).unwrap();
        assert_eq!(series.timestamps(), &[hours_from_epoch(1), hours_from_epoch(3)]);
        assert_eq!(series.values(), &[Some(1.0), Some(3.0)]);

        let res = TimeSeriesData::from_points(points, DuplicatePolicy::Block);
        assert!(matches!(res, Err(TsError::DuplicateSample(_))));
    }

    #[test]
    fn insert_keeps_order() {
        let mut series = hourly_series(&[Some(0.0), Some(1.0), Some(3.0)]);
        assert_eq!(series.insert(hours_from_epoch(5), Some(5.0), None).unwrap(), 1);
        assert_eq!(series.insert(hours_from_epoch(-1), Some(-1.0), None).unwrap(), 1);
        assert_eq!(series.insert(hours_from_epoch(1), Some(10.0), None).unwrap(), 0);
        assert!(series.require_sorted().is_ok());
        assert_eq!(series.len(), 5);
        assert_eq!(series.value_at(hours_from_epoch(1)), Some(Some(10.0)));
        assert_eq!(series.first().unwrap().value, Some(-1.0));
    }

    #[test]
    fn append_trusts_caller_order() {
        let mut series = hourly_series(&[Some(0.0), Some(1.0)]);
        series.append(hours_from_epoch(0), Some(9.0));
        assert_eq!(series.len(), 3);
        assert!(series.require_sorted().is_err());
    }

    #[test]
    fn navigation() {
        let series = hourly_series(&[None, Some(1.0), Some(2.0), None]);
        assert_eq!(series.first_value_point().unwrap().timestamp, hours_from_epoch(1));
        assert_eq!(series.last_value_point().unwrap().timestamp, hours_from_epoch(2));
        assert_eq!(series.first_after(hours_from_epoch(1)).unwrap().value, Some(2.0));
        assert_eq!(series.last_before(hours_from_epoch(1)).unwrap().value, None);
        assert!(series.last_before(hours_from_epoch(0)).is_none());
        assert!(series.first_after(hours_from_epoch(3)).is_none());
        assert_eq!(series.value_at(hours_from_epoch(3)), Some(None));
        assert_eq!(series.value_at(hours_from_epoch(7)), None);
        assert_eq!(series.time_span(), Duration::hours(3));
        assert_eq!(series.present_count(), 2);
    }

    #[test]
    fn range_is_inclusive() {
        let series = hourly_series(&[Some(0.0), Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        let sub = series.range(hours_from_epoch(1), hours_from_epoch(3));
        assert_eq!(sub.values(), &[Some(1.0), Some(2.0), Some(3.0)]);
        assert!(series.range(hours_from_epoch(6), hours_from_epoch(8)).is_empty());
        assert_eq!(series.tail_from(hours_from_epoch(3)).len(), 2);
    }

    #[test]
    fn sorted_set_view() {
        let series = hourly_series(&[Some(0.0), None, Some(2.0)]);
        let set = series.to_sorted_set();
        assert_eq!(set.len(), 3);
        assert!(set.iter().next().unwrap().0.value == Some(0.0));
    }
}
