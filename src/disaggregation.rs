//! Turns a cumulative series back into per-step increments.
//!
//! A negative delta means the counter was reset, in which case the raw value after the
//! reset is taken as the increment.

use crate::common::types::SampleValue;
use crate::error::TsResult;
use crate::series::TimeSeriesData;

fn increment<T: SampleValue>(previous: Option<T>, current: Option<T>) -> Option<T> {
    let (previous, current) = (previous?, current?);
    let delta = current - previous;
    if delta < T::zero() {
        Some(current)
    } else {
        Some(delta)
    }
}

impl<T: SampleValue> TimeSeriesData<T> {
    /// Increment from each point to the next, stamped with the later timestamp.
    pub fn disaggregate_forward(&self) -> TsResult<TimeSeriesData<T>> {
        self.disaggregate(true)
    }

    /// Increment from each point to the next, stamped with the earlier timestamp.
    pub fn disaggregate_backward(&self) -> TsResult<TimeSeriesData<T>> {
        self.disaggregate(false)
    }

    fn disaggregate(&self, forward: bool) -> TsResult<TimeSeriesData<T>> {
        self.require_sorted()?;
        let len = self.len().saturating_sub(1);
        let mut res = TimeSeriesData::with_capacity(len);
        for i in 0..len {
            let ts = if forward { self.timestamps[i + 1] } else { self.timestamps[i] };
            res.append(ts, increment(self.values[i], self.values[i + 1]));
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::utils::{hourly_series, hours_from_epoch};

    #[test]
    fn forward_with_reset() {
        let series = hourly_series(&[Some(0.0), Some(5.0), Some(3.0), Some(10.0)]);
        let res = series.disaggregate_forward().unwrap();
        assert_eq!(res.values(), &[Some(5.0), Some(3.0), Some(7.0)]);
        assert_eq!(res.timestamps(), &series.timestamps()[1..]);
    }

    #[test]
    fn backward_with_reset() {
        let series = hourly_series(&[Some(0.0), Some(5.0), Some(3.0), Some(10.0)]);
        let res = series.disaggregate_backward().unwrap();
        assert_eq!(res.values(), &[Some(5.0), Some(3.0), Some(7.0)]);
        assert_eq!(res.timestamps(), &series.timestamps()[..3]);
    }

    #[test]
    fn missing_values_propagate() {
        let series = hourly_series(&[Some(1.0), None, Some(4.0), Some(6.0)]);
        let res = series.disaggregate_forward().unwrap();
        assert_eq!(res.values(), &[None, None, Some(2.0)]);
        assert_eq!(res.first().unwrap().timestamp, hours_from_epoch(1));
    }

    #[test]
    fn short_series_yields_empty() {
        assert!(hourly_series(&[Some(1.0)]).disaggregate_forward().unwrap().is_empty());
        assert!(hourly_series(&[]).disaggregate_backward().unwrap().is_empty());
    }
}
