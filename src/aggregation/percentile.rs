use crate::common::types::SampleValue;
use crate::error::{TsError, TsResult};
use crate::series::TimeSeriesData;

impl<T: SampleValue> TimeSeriesData<T> {
    /// Value below which `p` percent of the present values fall (nearest-rank method).
    ///
    /// `p` must be in `(0, 100]`. Returns `None` when the series has no present values.
    pub fn percentile_value(&self, p: f64) -> TsResult<Option<T>> {
        if !(p > 0.0 && p <= 100.0) {
            return Err(TsError::InvalidArgument(format!(
                "percentile must be in (0, 100], got {p}"
            )));
        }
        let mut values: Vec<T> = self.present_values().collect();
        if values.is_empty() {
            return Ok(None);
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let rank = (p / 100.0 * values.len() as f64).ceil() as usize;
        let idx = rank.clamp(1, values.len()) - 1;
        Ok(Some(values[idx]))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::TsError;
    use crate::tests::utils::hourly_series;
    use test_case::test_case;

    #[test_case(10.0, 1.0 ; "lowest rank")]
    #[test_case(50.0, 5.0 ; "median")]
    #[test_case(55.0, 6.0 ; "ceiling rank")]
    #[test_case(100.0, 10.0 ; "maximum")]
    fn nearest_rank(p: f64, expected: f64) {
        let values: Vec<_> = [7.0, 3.0, 10.0, 1.0, 5.0, 2.0, 9.0, 4.0, 8.0, 6.0]
            .into_iter()
            .map(Some)
            .chain(std::iter::once(None))
            .collect();
        let series = hourly_series(&values);
        assert_eq!(series.percentile_value(p).unwrap(), Some(expected));
    }

    #[test_case(0.0 ; "zero")]
    #[test_case(-5.0 ; "negative")]
    #[test_case(100.5 ; "above hundred")]
    #[test_case(f64::NAN ; "nan")]
    fn out_of_range_percentile(p: f64) {
        let series = hourly_series(&[Some(1.0)]);
        assert!(matches!(series.percentile_value(p), Err(TsError::InvalidArgument(_))));
    }

    #[test]
    fn all_missing() {
        let series = hourly_series(&[None, None]);
        assert_eq!(series.percentile_value(50.0).unwrap(), None);
    }
}
