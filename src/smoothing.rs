//! Savitzky-Golay smoothing.
//!
//! Each output sample is the value at the centre of a least-squares polynomial fitted to
//! the surrounding window. For an equidistant window the fit reduces to a fixed convolution,
//! so the coefficients are computed once per `(window, order)` pair.

use tracing::debug;

use crate::common::types::SampleValue;
use crate::config::{get_global_settings, AnalysisSettings};
use crate::error::{TsError, TsResult};
use crate::parallel::fill_chunks;
use crate::series::{TimeSeriesData, TimeSeriesDataType};

pub const MAX_SMOOTHING_ORDER: usize = 5;

/// Convolution coefficients for a centred window of `window` points fitted with a
/// polynomial of degree `order`.
#[derive(Debug, Clone, PartialEq)]
pub struct SavitzkyGolayFilter {
    window: usize,
    order: usize,
    coefficients: Vec<f64>,
}

impl SavitzkyGolayFilter {
    pub fn new(window: usize, order: usize) -> TsResult<Self> {
        if order > MAX_SMOOTHING_ORDER {
            return Err(TsError::InvalidArgument(format!(
                "order must be in [0, {MAX_SMOOTHING_ORDER}], got {order}"
            )));
        }
        if window % 2 == 0 {
            return Err(TsError::InvalidArgument(format!("window must be odd, got {window}")));
        }
        if window <= order + 1 {
            return Err(TsError::InvalidArgument(format!(
                "window ({window}) must be greater than order + 1 ({})",
                order + 1
            )));
        }
        let coefficients = coefficients(window, order);
        Ok(Self { window, order, coefficients })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    fn half_width(&self) -> usize {
        (self.window - 1) / 2
    }

    /// Smoothed value at `index` of `values`, mirroring the input beyond both ends.
    /// `values` must hold more than `half_width` points.
    fn apply_at(&self, values: &[f64], index: usize) -> f64 {
        let m = self.half_width() as isize;
        let last = values.len() as isize - 1;
        self.coefficients
            .iter()
            .enumerate()
            .map(|(k, c)| {
                let mut j = index as isize + k as isize - m;
                if j < 0 {
                    j = -j;
                } else if j > last {
                    j = 2 * last - j;
                }
                c * values[j as usize]
            })
            .sum()
    }
}

/// Closed-form centre-point weights, indexed from `-m` to `m`.
fn coefficients(window: usize, order: usize) -> Vec<f64> {
    let m = ((window - 1) / 2) as f64;
    let half = (window - 1) / 2;
    (0..window)
        .map(|k| {
            let i = k as f64 - half as f64;
            match order {
                0 | 1 => 1.0 / window as f64,
                2 | 3 => {
                    let num = 3.0 * (3.0 * m * m + 3.0 * m - 1.0) - 15.0 * i * i;
                    let den = (2.0 * m + 3.0) * (2.0 * m + 1.0) * (2.0 * m - 1.0);
                    num / den
                }
                _ => {
                    let m2 = m * m;
                    let i2 = i * i;
                    let num = (15.0 * m2 * m2 + 30.0 * m2 * m - 35.0 * m2 - 50.0 * m + 12.0)
                        - 35.0 * (2.0 * m2 + 2.0 * m - 3.0) * i2
                        + 63.0 * i2 * i2;
                    let den = (2.0 * m + 5.0)
                        * (2.0 * m + 3.0)
                        * (2.0 * m + 1.0)
                        * (2.0 * m - 1.0)
                        * (2.0 * m - 3.0);
                    15.0 / 4.0 * num / den
                }
            }
        })
        .collect()
}

impl<T: SampleValue> TimeSeriesData<T> {
    /// Savitzky-Golay smoothed copy with the same timestamps.
    ///
    /// Missing values are gap filled linearly first. Leading and trailing missing values
    /// have nothing to interpolate from and stay missing.
    pub fn smooth(&self, window: usize, order: usize) -> TsResult<TimeSeriesData<T>> {
        self.smooth_with_settings(window, order, get_global_settings())
    }

    pub fn smooth_with_settings(
        &self,
        window: usize,
        order: usize,
        settings: &AnalysisSettings,
    ) -> TsResult<TimeSeriesData<T>> {
        let filter = SavitzkyGolayFilter::new(window, order)?;
        let found = self.present_count();
        if found < window {
            return Err(TsError::InsufficientData { required: window, found });
        }

        let filled = self.gap_fill(TimeSeriesDataType::Instantaneous)?;
        let first = filled.values.iter().position(|v| v.is_some());
        let last = filled.values.iter().rposition(|v| v.is_some());
        let (Some(first), Some(last)) = (first, last) else {
            return Err(TsError::InsufficientData { required: window, found: 0 });
        };

        let block: Vec<f64> = filled.values[first..=last]
            .iter()
            .map(|v| v.map_or(f64::NAN, |v| v.as_f64()))
            .collect();

        let mut smoothed = vec![0.0; block.len()];
        fill_chunks(&mut smoothed, settings, |offset, chunk| {
            for (i, out) in chunk.iter_mut().enumerate() {
                *out = filter.apply_at(&block, offset + i);
            }
        });

        let mut values = vec![None; self.len()];
        for (i, v) in smoothed.into_iter().enumerate() {
            values[first + i] = Some(T::from_f64_lossy(v));
        }
        debug!(len = self.len(), window, order, "smoothed series");
        TimeSeriesData::from_vecs(self.timestamps.clone(), values)
    }
}
