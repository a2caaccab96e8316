//! Access to stored series by id, and batch analysis on top of it.

use std::sync::RwLock;

use ahash::AHashMap;
use chrono::Duration;
use rayon::prelude::*;
use tracing::debug;

use crate::aggregation::AggregationType;
use crate::common::time::Period;
use crate::common::types::{SampleValue, Timestamp};
use crate::duration_curve::DurationCurveOptions;
use crate::error::{TsError, TsResult};
use crate::reduction::ReductionOptions;
use crate::series::{TimeSeriesData, TimeSeriesDataType};
use crate::trendline::Trendline;

/// Source of series data. Implemented by whatever storage layer owns the series.
pub trait TimeSeriesProvider<T: SampleValue>: Send + Sync {
    fn get(&self, id: &str) -> TsResult<TimeSeriesData<T>>;

    /// Points of series `id` with `from <= timestamp <= to`.
    fn get_values(&self, id: &str, from: Timestamp, to: Timestamp) -> TsResult<TimeSeriesData<T>> {
        if to < from {
            return Err(TsError::InvalidArgument(format!("end {to} is before start {from}")));
        }
        Ok(self.get(id)?.range(from, to))
    }
}

/// Provider backed by a map of series held in memory.
#[derive(Debug)]
pub struct InMemoryProvider<T> {
    series: RwLock<AHashMap<String, TimeSeriesData<T>>>,
}

impl<T> Default for InMemoryProvider<T> {
    fn default() -> Self {
        Self { series: RwLock::new(AHashMap::new()) }
    }
}

impl<T: SampleValue> InMemoryProvider<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `series` under `id`, returning the series it replaced.
    pub fn insert(&self, id: &str, series: TimeSeriesData<T>) -> Option<TimeSeriesData<T>> {
        let mut map = self.series.write().unwrap_or_else(|e| e.into_inner());
        map.insert(id.to_string(), series)
    }

    pub fn remove(&self, id: &str) -> Option<TimeSeriesData<T>> {
        let mut map = self.series.write().unwrap_or_else(|e| e.into_inner());
        map.remove(id)
    }

    pub fn len(&self) -> usize {
        self.series.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<String> {
        let map = self.series.read().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<_> = map.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl<T: SampleValue> FromIterator<(String, TimeSeriesData<T>)> for InMemoryProvider<T> {
    fn from_iter<I: IntoIterator<Item = (String, TimeSeriesData<T>)>>(iter: I) -> Self {
        Self { series: RwLock::new(iter.into_iter().collect()) }
    }
}

impl<T: SampleValue> TimeSeriesProvider<T> for InMemoryProvider<T> {
    fn get(&self, id: &str) -> TsResult<TimeSeriesData<T>> {
        let map = self.series.read().unwrap_or_else(|e| e.into_inner());
        map.get(id)
            .cloned()
            .ok_or_else(|| TsError::SeriesNotFound(id.to_string()))
    }
}

/// Runs the analysis operations over several series fetched from a provider.
///
/// Every batch call resolves all ids first; the first failing series aborts the whole
/// call with its error. Results are keyed by series id.
pub struct SeriesAnalyzer<P> {
    provider: P,
}

impl<P> SeriesAnalyzer<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn map_series<T, R, F>(&self, ids: &[&str], f: F) -> TsResult<AHashMap<String, R>>
    where
        T: SampleValue,
        P: TimeSeriesProvider<T>,
        R: Send,
        F: Fn(&TimeSeriesData<T>) -> TsResult<R> + Send + Sync,
    {
        debug!(count = ids.len(), "running batch analysis");
        let results = ids
            .par_iter()
            .map(|id| {
                let series = self.provider.get(id)?;
                Ok((id.to_string(), f(&series)?))
            })
            .collect::<TsResult<Vec<_>>>()?;
        Ok(results.into_iter().collect())
    }

    pub fn aggregate_many<T>(&self, ids: &[&str], kind: AggregationType) -> TsResult<AHashMap<String, Option<T>>>
    where
        T: SampleValue,
        P: TimeSeriesProvider<T>,
    {
        self.map_series::<T, _, _>(ids, |series| Ok(series.aggregate(kind)))
    }

    pub fn aggregate_by_period_many<T>(
        &self,
        ids: &[&str],
        kind: AggregationType,
        period: Period,
    ) -> TsResult<AHashMap<String, TimeSeriesData<T>>>
    where
        T: SampleValue,
        P: TimeSeriesProvider<T>,
    {
        self.map_series::<T, _, _>(ids, |series| series.aggregate_by_period(kind, period))
    }

    pub fn percentile_many<T>(&self, ids: &[&str], p: f64) -> TsResult<AHashMap<String, Option<T>>>
    where
        T: SampleValue,
        P: TimeSeriesProvider<T>,
    {
        self.map_series::<T, _, _>(ids, |series| series.percentile_value(p))
    }

    pub fn resample_many<T>(
        &self,
        ids: &[&str],
        step: Duration,
        data_type: TimeSeriesDataType,
    ) -> TsResult<AHashMap<String, TimeSeriesData<T>>>
    where
        T: SampleValue,
        P: TimeSeriesProvider<T>,
    {
        self.map_series::<T, _, _>(ids, |series| series.resample(step, data_type))
    }

    pub fn reduce_many<T>(
        &self,
        ids: &[&str],
        options: &ReductionOptions,
    ) -> TsResult<AHashMap<String, TimeSeriesData<T>>>
    where
        T: SampleValue,
        P: TimeSeriesProvider<T>,
    {
        self.map_series::<T, _, _>(ids, |series| series.reduce(options))
    }

    pub fn smooth_many<T>(
        &self,
        ids: &[&str],
        window: usize,
        order: usize,
    ) -> TsResult<AHashMap<String, TimeSeriesData<T>>>
    where
        T: SampleValue,
        P: TimeSeriesProvider<T>,
    {
        self.map_series::<T, _, _>(ids, |series| series.smooth(window, order))
    }

    pub fn trendline_many<T>(&self, ids: &[&str]) -> TsResult<AHashMap<String, Trendline<T>>>
    where
        T: SampleValue,
        P: TimeSeriesProvider<T>,
    {
        self.map_series::<T, _, _>(ids, |series| series.linear_trendline())
    }

    pub fn duration_curve_many<T>(
        &self,
        ids: &[&str],
        options: &DurationCurveOptions,
    ) -> TsResult<AHashMap<String, Vec<(T, f64)>>>
    where
        T: SampleValue,
        P: TimeSeriesProvider<T>,
    {
        self.map_series::<T, _, _>(ids, |series| series.duration_curve(options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::tests::utils::{hourly_series, hours_from_epoch};

    fn provider() -> InMemoryProvider<f64> {
        let provider = InMemoryProvider::new();
        provider.insert("level", hourly_series(&[Some(1.0), Some(3.0), None, Some(5.0)]));
        provider.insert("flow", hourly_series(&[Some(10.0), Some(20.0), Some(30.0), Some(40.0)]));
        provider
    }

    #[test]
    fn get_values_is_inclusive() {
        let provider = provider();
        let res = provider.get_values("flow", hours_from_epoch(1), hours_from_epoch(2)).unwrap();
        assert_eq!(res.values(), &[Some(20.0), Some(30.0)]);

        let err = provider.get("rain").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn aggregate_many_by_id() {
        let analyzer = SeriesAnalyzer::new(provider());
        let res = analyzer.aggregate_many::<f64>(&["level", "flow"], AggregationType::Sum).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res["level"], Some(9.0));
        assert_eq!(res["flow"], Some(100.0));
    }

    #[test]
    fn unknown_id_fails_batch() {
        let analyzer = SeriesAnalyzer::new(provider());
        let res = analyzer.percentile_many::<f64>(&["level", "missing"], 50.0);
        assert_eq!(res, Err(TsError::SeriesNotFound("missing".to_string())));
    }

    #[test]
    fn trendline_and_period_batches() -> anyhow::Result<()> {
        let analyzer = SeriesAnalyzer::new(provider());
        let trends = analyzer.trendline_many::<f64>(&["flow"])?;
        // 10 per hour
        assert!((trends["flow"].slope - 240.0).abs() < 1e-9);

        let daily = analyzer.aggregate_by_period_many::<f64>(&["flow", "level"], AggregationType::Maximum, Period::Daily)?;
        assert_eq!(daily["flow"].values(), &[Some(40.0)]);
        assert_eq!(daily["level"].values(), &[Some(5.0)]);
        Ok(())
    }
}
