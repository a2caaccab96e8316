//! Analysis engine for hydrological and environmental time series.
//!
//! A series is a pair of parallel vectors: ascending timestamps and optional values.
//! Operations never modify their input except for the explicit `append` and `insert`
//! mutators. Each returns a new series, a scalar, or a [`TsError`].

pub mod aggregation;
pub mod common;
pub mod config;
pub mod disaggregation;
pub mod duration_curve;
pub mod error;
pub mod gap_fill;
pub mod merge;
pub(crate) mod parallel;
pub mod provider;
pub mod reduction;
pub mod resample;
pub mod series;
pub mod smoothing;
pub mod trendline;

#[cfg(test)]
mod tests;

pub use aggregation::{AggregationType, Aggregator, MovingWindow, WindowAlignment};
pub use common::{Period, SampleValue, Timestamp};
pub use config::{get_global_settings, AnalysisSettings};
pub use duration_curve::{DurationCurveOptions, EXTREME_PROBABILITIES};
pub use error::{ErrorKind, TsError, TsResult};
pub use gap_fill::GapFillResult;
pub use merge::MergeResult;
pub use provider::{InMemoryProvider, SeriesAnalyzer, TimeSeriesProvider};
pub use reduction::ReductionOptions;
pub use series::{
    ByTimestamp, DataPoint, DuplicatePolicy, TimeSeriesData, TimeSeriesDataType, TimeSeriesDataWFlag,
};
pub use smoothing::SavitzkyGolayFilter;
pub use trendline::Trendline;
