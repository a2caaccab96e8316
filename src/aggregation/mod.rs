//! Basic aggregation over whole series, sub-ranges, calendar periods and moving windows.
//!
//! Missing values never count towards an aggregate. When nothing is left to aggregate,
//! `Sum` and `Average` yield zero while `Minimum` and `Maximum` yield no value.

mod moving;
mod percentile;
mod period;

pub use moving::*;

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::types::{SampleValue, Timestamp};
use crate::error::{TsError, TsResult};
use crate::series::TimeSeriesData;

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum AggregationType {
    #[default]
    Average,
    Maximum,
    Minimum,
    Sum,
}

impl AggregationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationType::Average => "average",
            AggregationType::Maximum => "maximum",
            AggregationType::Minimum => "minimum",
            AggregationType::Sum => "sum",
        }
    }

    /// Result of aggregating nothing.
    pub fn empty_value<T: SampleValue>(&self) -> Option<T> {
        match self {
            AggregationType::Average | AggregationType::Sum => Some(T::zero()),
            AggregationType::Maximum | AggregationType::Minimum => None,
        }
    }

    pub fn apply<T, I>(&self, values: I) -> Option<T>
    where
        T: SampleValue,
        I: IntoIterator<Item = Option<T>>,
    {
        let mut aggregator = Aggregator::new(*self);
        for value in values {
            aggregator.update(value);
        }
        aggregator.finalize()
    }
}

impl Display for AggregationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AggregationType {
    type Err = TsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            s if s.eq_ignore_ascii_case("avg") || s.eq_ignore_ascii_case("average") => Ok(AggregationType::Average),
            s if s.eq_ignore_ascii_case("max") || s.eq_ignore_ascii_case("maximum") => Ok(AggregationType::Maximum),
            s if s.eq_ignore_ascii_case("min") || s.eq_ignore_ascii_case("minimum") => Ok(AggregationType::Minimum),
            s if s.eq_ignore_ascii_case("sum") => Ok(AggregationType::Sum),
            _ => Err(TsError::InvalidArgument(format!("invalid aggregation type: {s}"))),
        }
    }
}

/// Incremental accumulator for one [`AggregationType`].
#[derive(Debug, Clone)]
pub struct Aggregator<T> {
    kind: AggregationType,
    sum: T,
    count: usize,
    min: Option<T>,
    max: Option<T>,
}

impl<T: SampleValue> Aggregator<T> {
    pub fn new(kind: AggregationType) -> Self {
        Self {
            kind,
            sum: T::zero(),
            count: 0,
            min: None,
            max: None,
        }
    }

    pub fn update(&mut self, value: Option<T>) {
        let Some(value) = value else {
            return;
        };
        self.sum = self.sum + value;
        self.count += 1;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn finalize(&self) -> Option<T> {
        if self.count == 0 {
            return self.kind.empty_value();
        }
        match self.kind {
            AggregationType::Sum => Some(self.sum),
            AggregationType::Average => Some(self.sum / T::from_count(self.count)),
            AggregationType::Minimum => self.min,
            AggregationType::Maximum => self.max,
        }
    }

    pub fn reset(&mut self) {
        self.sum = T::zero();
        self.count = 0;
        self.min = None;
        self.max = None;
    }
}

impl<T: SampleValue> TimeSeriesData<T> {
    pub fn aggregate(&self, kind: AggregationType) -> Option<T> {
        kind.apply(self.values.iter().copied())
    }

    /// Sum of present values; zero for an empty or all-missing series.
    pub fn sum(&self) -> T {
        self.aggregate(AggregationType::Sum).unwrap_or_else(T::zero)
    }

    /// Mean of present values; zero for an empty or all-missing series.
    pub fn average(&self) -> T {
        self.aggregate(AggregationType::Average).unwrap_or_else(T::zero)
    }

    pub fn minimum(&self) -> Option<T> {
        self.aggregate(AggregationType::Minimum)
    }

    pub fn maximum(&self) -> Option<T> {
        self.aggregate(AggregationType::Maximum)
    }

    /// Aggregate over points within `start..=end`.
    pub fn aggregate_range(&self, kind: AggregationType, start: Timestamp, end: Timestamp) -> TsResult<Option<T>> {
        if end < start {
            return Err(TsError::InvalidArgument(format!(
                "range end {end} is before start {start}"
            )));
        }
        Ok(self.range(start, end).aggregate(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::{assert_close, hourly_series, hours_from_epoch};

    fn with_gaps() -> TimeSeriesData<f64> {
        hourly_series(&[Some(11.2), None, Some(22.4), Some(-3.0)])
    }

    #[test]
    fn average_with_gaps() {
        let series = with_gaps();
        assert_close((series.average() * 1e6).round() / 1e6, 10.2, 1e-12);
        assert_close(series.sum(), 30.6, 1e-9);
        assert_eq!(series.maximum(), Some(22.4));
        assert_eq!(series.minimum(), Some(-3.0));
    }

    #[test]
    fn empty_series_rule() {
        for series in [TimeSeriesData::<f64>::new(), hourly_series(&[None, None, None])] {
            assert_eq!(series.average(), 0.0);
            assert_eq!(series.sum(), 0.0);
            assert_eq!(series.maximum(), None);
            assert_eq!(series.minimum(), None);
            assert_eq!(series.aggregate(AggregationType::Average), Some(0.0));
            assert_eq!(series.aggregate(AggregationType::Sum), Some(0.0));
        }
    }

    #[test]
    fn works_for_f32() {
        let series = TimeSeriesData::<f32>::from_vecs(
            vec![hours_from_epoch(0), hours_from_epoch(1)],
            vec![Some(1.5), Some(2.5)],
        )
        .unwrap();
        assert_eq!(series.average(), 2.0f32);
        assert_eq!(series.sum(), 4.0f32);
    }

    #[test]
    fn aggregate_range_is_inclusive() {
        let series = hourly_series(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        let sum = series
            .aggregate_range(AggregationType::Sum, hours_from_epoch(1), hours_from_epoch(2))
            .unwrap();
        assert_eq!(sum, Some(5.0));

        let max = series
            .aggregate_range(AggregationType::Maximum, hours_from_epoch(10), hours_from_epoch(12))
            .unwrap();
        assert_eq!(max, None);

        let res = series.aggregate_range(AggregationType::Sum, hours_from_epoch(2), hours_from_epoch(1));
        assert!(matches!(res, Err(TsError::InvalidArgument(_))));
    }

    #[test]
    fn aggregator_reset() {
        let mut aggregator = Aggregator::new(AggregationType::Maximum);
        aggregator.update(Some(3.0));
        aggregator.update(None);
        assert_eq!(aggregator.finalize(), Some(3.0));
        assert_eq!(aggregator.count(), 1);
        aggregator.reset();
        assert_eq!(aggregator.finalize(), None);
    }

    #[test]
    fn parse_aggregation_type() {
        assert_eq!("AVG".parse::<AggregationType>().unwrap(), AggregationType::Average);
        assert_eq!("maximum".parse::<AggregationType>().unwrap(), AggregationType::Maximum);
        assert!("median".parse::<AggregationType>().is_err());
    }
}
