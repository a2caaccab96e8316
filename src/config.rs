use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::warn;

use crate::error::{TsError, TsResult};

/// Series longer than this are processed in parallel chunks.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 20_000;
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;
pub const DEFAULT_REDUCTION_MINIMUM_COUNT: usize = 3000;
pub const DEFAULT_REDUCTION_RELATIVE_TOLERANCE: f64 = 1.0;
pub const DEFAULT_DURATION_CURVE_MIN_VALUES: usize = 100;

const ENV_PARALLEL_THRESHOLD: &str = "HYDRO_SERIES_PARALLEL_THRESHOLD";
const ENV_CHUNK_SIZE: &str = "HYDRO_SERIES_CHUNK_SIZE";
const ENV_REDUCTION_MIN_COUNT: &str = "HYDRO_SERIES_REDUCTION_MIN_COUNT";
const ENV_REDUCTION_TOLERANCE: &str = "HYDRO_SERIES_REDUCTION_TOLERANCE";
const ENV_DURATION_CURVE_MIN_VALUES: &str = "HYDRO_SERIES_DURATION_CURVE_MIN_VALUES";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Series with more points than this are split into chunks and processed on the
    /// rayon thread pool (reduction and smoothing only).
    pub parallel_threshold: usize,

    /// Number of points in each parallel chunk.
    pub chunk_size: usize,

    /// Series with this many points or fewer are returned unchanged by `reduce`.
    pub reduction_minimum_count: usize,

    /// Default reduction tolerance, as a percentage of the value range.
    pub reduction_relative_tolerance: f64,

    /// Minimum number of present values required by the duration curve.
    pub duration_curve_min_values: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            chunk_size: DEFAULT_CHUNK_SIZE,
            reduction_minimum_count: DEFAULT_REDUCTION_MINIMUM_COUNT,
            reduction_relative_tolerance: DEFAULT_REDUCTION_RELATIVE_TOLERANCE,
            duration_curve_min_values: DEFAULT_DURATION_CURVE_MIN_VALUES,
        }
    }
}

impl AnalysisSettings {
    /// Defaults overlaid with any `HYDRO_SERIES_*` environment variables.
    pub fn from_env() -> Self {
        let mut res = Self::default();
        if let Some(v) = get_setting_from_env(ENV_PARALLEL_THRESHOLD) {
            res.parallel_threshold = v;
        }
        if let Some(v) = get_setting_from_env(ENV_CHUNK_SIZE) {
            res.chunk_size = v;
        }
        if let Some(v) = get_setting_from_env(ENV_REDUCTION_MIN_COUNT) {
            res.reduction_minimum_count = v;
        }
        if let Some(v) = get_setting_from_env(ENV_REDUCTION_TOLERANCE) {
            res.reduction_relative_tolerance = v;
        }
        if let Some(v) = get_setting_from_env(ENV_DURATION_CURVE_MIN_VALUES) {
            res.duration_curve_min_values = v;
        }
        if let Err(e) = res.validate() {
            warn!("ignoring environment settings: {e}");
            return Self::default();
        }
        res
    }

    pub fn from_json(json: &str) -> TsResult<Self> {
        let settings: AnalysisSettings = serde_json::from_str(json)
            .map_err(|e| TsError::InvalidArgument(format!("invalid settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> TsResult<()> {
        if self.chunk_size == 0 {
            return Err(TsError::InvalidArgument("chunk_size must be positive".to_string()));
        }
        if self.parallel_threshold < self.chunk_size {
            return Err(TsError::InvalidArgument(format!(
                "parallel_threshold ({}) must not be below chunk_size ({})",
                self.parallel_threshold, self.chunk_size
            )));
        }
        if self.reduction_minimum_count < 3 {
            return Err(TsError::InvalidArgument(
                "reduction_minimum_count must be at least 3".to_string(),
            ));
        }
        if !(self.reduction_relative_tolerance > 0.0 && self.reduction_relative_tolerance <= 100.0) {
            return Err(TsError::InvalidArgument(
                "reduction_relative_tolerance must be in (0, 100]".to_string(),
            ));
        }
        Ok(())
    }
}

static GLOBAL_SETTINGS: OnceLock<AnalysisSettings> = OnceLock::new();

pub fn get_global_settings() -> &'static AnalysisSettings {
    GLOBAL_SETTINGS.get_or_init(AnalysisSettings::from_env)
}

fn get_setting_from_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("cannot parse {name}={raw}, using default");
            None
        }
    }
}
