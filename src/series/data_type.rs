use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::time::duration_seconds;
use crate::common::types::{SampleValue, Timestamp};
use crate::error::{TsError, TsResult};
use crate::series::DataPoint;

/// Interpolation policy. Describes what a sample value represents over time.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TimeSeriesDataType {
    /// Point samples of a continuously varying quantity (e.g. water level).
    #[default]
    Instantaneous,
    /// Running total since some fixed origin.
    Accumulated,
    /// Amount accrued since the previous sample (e.g. rainfall per interval).
    StepAccumulated,
    /// Value holds from its timestamp until the next sample.
    MeanStepForward,
    /// Value applies to the interval ending at its timestamp.
    MeanStepBackward,
}

impl TimeSeriesDataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSeriesDataType::Instantaneous => "instantaneous",
            TimeSeriesDataType::Accumulated => "accumulated",
            TimeSeriesDataType::StepAccumulated => "step_accumulated",
            TimeSeriesDataType::MeanStepForward => "mean_step_forward",
            TimeSeriesDataType::MeanStepBackward => "mean_step_backward",
        }
    }

    /// Value at `t`, strictly between two bracketing samples.
    ///
    /// Both values must be present and `p0.timestamp < t < p1.timestamp`.
    pub fn interpolate<T: SampleValue>(
        &self,
        p0: &DataPoint<T>,
        p1: &DataPoint<T>,
        t: Timestamp,
    ) -> TsResult<T> {
        if !(p0.timestamp < t && t < p1.timestamp) {
            return Err(TsError::InvalidArgument(format!(
                "interpolation timestamp {t} must lie strictly between {} and {}",
                p0.timestamp, p1.timestamp
            )));
        }
        let (v0, v1) = match (p0.value, p1.value) {
            (Some(v0), Some(v1)) => (v0, v1),
            _ => {
                return Err(TsError::InvalidArgument(format!(
                    "cannot interpolate at {t}: bracketing value is missing"
                )))
            }
        };

        let fraction = || {
            let span = duration_seconds(p1.timestamp - p0.timestamp);
            let elapsed = duration_seconds(t - p0.timestamp);
            T::from_f64_lossy(elapsed / span)
        };

        let value = match self {
            TimeSeriesDataType::Instantaneous | TimeSeriesDataType::Accumulated => {
                v0 + (v1 - v0) * fraction()
            }
            // pro-rata share of the amount accrued over (p0, p1]
            TimeSeriesDataType::StepAccumulated => v1 * fraction(),
            TimeSeriesDataType::MeanStepForward => v0,
            TimeSeriesDataType::MeanStepBackward => v1,
        };
        Ok(value)
    }
}

impl Display for TimeSeriesDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimeSeriesDataType {
    type Err = TsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace(['_', '-', ' '], "");
        match normalized.as_str() {
            "instantaneous" => Ok(TimeSeriesDataType::Instantaneous),
            "accumulated" => Ok(TimeSeriesDataType::Accumulated),
            "stepaccumulated" => Ok(TimeSeriesDataType::StepAccumulated),
            "meanstepforward" => Ok(TimeSeriesDataType::MeanStepForward),
            "meanstepbackward" => Ok(TimeSeriesDataType::MeanStepBackward),
            _ => Err(TsError::InvalidArgument(format!("invalid time series data type: {s}"))),
        }
    }
}
