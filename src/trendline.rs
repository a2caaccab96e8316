use serde::{Deserialize, Serialize};

use crate::common::time::elapsed_days;
use crate::common::types::SampleValue;
use crate::error::{TsError, TsResult};
use crate::series::TimeSeriesData;

/// Least-squares line through the present values, with x measured in days since the
/// first timestamp of the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trendline<T> {
    /// Change in value per day.
    pub slope: T,
    /// Fitted value at the first timestamp.
    pub offset: T,
    /// The fitted line evaluated at the first and last timestamp.
    pub line: TimeSeriesData<T>,
}

impl<T: SampleValue> TimeSeriesData<T> {
    pub fn linear_trendline(&self) -> TsResult<Trendline<T>> {
        let found = self.present_count();
        if found < 2 {
            return Err(TsError::InsufficientData { required: 2, found });
        }
        self.require_sorted()?;

        let origin = self.timestamps[0];
        let points: Vec<(f64, f64)> = self
            .iter()
            .filter_map(|p| p.value.map(|v| (elapsed_days(origin, p.timestamp), v.as_f64())))
            .collect();

        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
        let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
            let dx = x - mean_x;
            (sxy + dx * (y - mean_y), sxx + dx * dx)
        });
        if sxx == 0.0 {
            return Err(TsError::InsufficientData { required: 2, found: 1 });
        }
        let slope = sxy / sxx;
        let offset = mean_y - slope * mean_x;

        let last = self.timestamps[self.len() - 1];
        let x_last = elapsed_days(origin, last);
        let mut line = TimeSeriesData::with_capacity(2);
        line.append(origin, Some(T::from_f64_lossy(offset)));
        line.append(last, Some(T::from_f64_lossy(slope * x_last + offset)));

        Ok(Trendline {
            slope: T::from_f64_lossy(slope),
            offset: T::from_f64_lossy(offset),
            line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::{assert_close, hourly_series, hours_from_epoch, series_from_hours};

    #[test]
    fn exact_line() {
        // 2 per day, starting at 5
        let values: Vec<_> = (0..49).map(|h| Some(5.0 + 2.0 * h as f64 / 24.0)).collect();
        let trend = hourly_series(&values).linear_trendline().unwrap();
        assert_close(trend.slope, 2.0, 1e-9);
        assert_close(trend.offset, 5.0, 1e-9);
        assert_eq!(trend.line.timestamps(), &[hours_from_epoch(0), hours_from_epoch(48)]);
        assert_close(trend.line.values()[1].unwrap(), 9.0, 1e-9);
    }

    #[test]
    fn skips_missing_values() {
        let series = series_from_hours(&[(0, None), (24, Some(1.0)), (48, None), (72, Some(3.0)), (96, None)]);
        let trend = series.linear_trendline().unwrap();
        assert_close(trend.slope, 1.0, 1e-12);
        // x is measured from the first timestamp, even when its value is missing
        assert_close(trend.offset, 0.0, 1e-12);
        assert_eq!(trend.line.first().unwrap().timestamp, hours_from_epoch(0));
        assert_close(trend.line.values()[1].unwrap(), 4.0, 1e-12);
    }

    #[test]
    fn noisy_data_fit() {
        let series = series_from_hours(&[(0, Some(1.0)), (24, Some(3.0)), (48, Some(2.0)), (72, Some(6.0))]);
        let trend = series.linear_trendline().unwrap();
        // x = [0, 1, 2, 3], y = [1, 3, 2, 6]
        assert_close(trend.slope, 1.4, 1e-12);
        assert_close(trend.offset, 0.9, 1e-12);
    }

    #[test]
    fn needs_two_values() {
        let series = hourly_series(&[None, Some(1.0), None]);
        assert_eq!(
            series.linear_trendline(),
            Err(TsError::InsufficientData { required: 2, found: 1 })
        );
    }
}
