use crate::aggregation::{AggregationType, Aggregator};
use crate::common::time::Period;
use crate::common::types::SampleValue;
use crate::error::TsResult;
use crate::series::TimeSeriesData;

impl<T: SampleValue> TimeSeriesData<T> {
    /// Groups points by calendar period and aggregates each group.
    ///
    /// The output holds one point per period that contains at least one sample, stamped
    /// with the period start. Periods holding only missing values follow the empty rule.
    pub fn aggregate_by_period(&self, kind: AggregationType, period: Period) -> TsResult<TimeSeriesData<T>> {
        self.require_sorted()?;
        let mut res = TimeSeriesData::new();
        let mut aggregator = Aggregator::new(kind);
        let mut current = None;

        for (ts, value) in self.timestamps.iter().zip(self.values.iter()) {
            let bucket = period.start_of(*ts);
            match current {
                Some(start) if start == bucket => {}
                Some(start) => {
                    res.append(start, aggregator.finalize());
                    aggregator.reset();
                    current = Some(bucket);
                }
                None => current = Some(bucket),
            }
            aggregator.update(*value);
        }
        if let Some(start) = current {
            res.append(start, aggregator.finalize());
        }
        Ok(res)
    }

    pub fn sum_by_period(&self, period: Period) -> TsResult<TimeSeriesData<T>> {
        self.aggregate_by_period(AggregationType::Sum, period)
    }

    pub fn average_by_period(&self, period: Period) -> TsResult<TimeSeriesData<T>> {
        self.aggregate_by_period(AggregationType::Average, period)
    }

    pub fn minimum_by_period(&self, period: Period) -> TsResult<TimeSeriesData<T>> {
        self.aggregate_by_period(AggregationType::Minimum, period)
    }

    pub fn maximum_by_period(&self, period: Period) -> TsResult<TimeSeriesData<T>> {
        self.aggregate_by_period(AggregationType::Maximum, period)
    }
}
