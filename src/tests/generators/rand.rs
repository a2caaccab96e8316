use std::f64::consts::PI;
use std::ops::Range;

use chrono::Duration;
use rand::prelude::*;
use rand_distr::StandardNormal;

use crate::common::types::Timestamp;
use crate::series::TimeSeriesData;
use crate::tests::generators::create_rng;
use crate::tests::utils::hours_from_epoch;

#[derive(Debug, Copy, Clone, Default)]
pub enum RandAlgo {
    #[default]
    Rand,
    Norm,
    /// Seasonal sine wave with normal noise, roughly shaped like a daily discharge record.
    Hydrograph,
}

/// GeneratorOptions contains the parameters for generating random time series data.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Start time of the time series.
    pub start: Timestamp,
    /// Interval between samples.
    pub interval: Duration,
    /// Range of values.
    pub range: Range<f64>,
    /// Number of samples.
    pub samples: usize,
    /// Fraction of samples replaced by missing values.
    pub missing_ratio: f64,
    /// Seed for random number generator.
    pub seed: Option<u64>,
    /// Type of random number generator.
    pub typ: RandAlgo,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            start: hours_from_epoch(0),
            interval: Duration::hours(1),
            range: 0.0..1.0,
            samples: 100,
            missing_ratio: 0.0,
            seed: Some(42),
            typ: RandAlgo::Rand,
        }
    }
}

trait NumGenerator {
    fn next(&mut self, index: usize) -> f64;
}

struct RandomGenerator {
    rng: StdRng,
    range: Range<f64>,
}

impl NumGenerator for RandomGenerator {
    fn next(&mut self, _index: usize) -> f64 {
        self.rng.gen_range(self.range.start..self.range.end)
    }
}

struct NormalGenerator {
    rng: StdRng,
    range: Range<f64>,
}

impl NumGenerator for NormalGenerator {
    fn next(&mut self, _index: usize) -> f64 {
        let m = self.rng.sample::<f64, _>(StandardNormal);
        let mid = (self.range.start + self.range.end) / 2.0;
        mid + (self.range.end - self.range.start) / 6.0 * m
    }
}

struct HydrographGenerator {
    rng: StdRng,
    range: Range<f64>,
    period: f64,
}

impl NumGenerator for HydrographGenerator {
    fn next(&mut self, index: usize) -> f64 {
        let amplitude = (self.range.end - self.range.start) / 2.0;
        let mid = self.range.start + amplitude;
        let noise = self.rng.sample::<f64, _>(StandardNormal) * amplitude * 0.05;
        mid + amplitude * 0.9 * (2.0 * PI * index as f64 / self.period).sin() + noise
    }
}

fn get_generator_impl(options: &GeneratorOptions) -> Result<Box<dyn NumGenerator>, String> {
    let rng = create_rng(options.seed)?;
    let range = options.range.clone();
    match options.typ {
        RandAlgo::Rand => Ok(Box::new(RandomGenerator { rng, range })),
        RandAlgo::Norm => Ok(Box::new(NormalGenerator { rng, range })),
        RandAlgo::Hydrograph => Ok(Box::new(HydrographGenerator { rng, range, period: 365.0 })),
    }
}

// Generates time series data from the given type.
pub(crate) fn generate_series_data(options: &GeneratorOptions) -> Result<TimeSeriesData<f64>, String> {
    let mut series = TimeSeriesData::with_capacity(options.samples);
    let mut generator = get_generator_impl(options)?;
    let mut gaps = create_rng(options.seed.map(|s| s.wrapping_add(1)))?;

    let mut t = options.start;
    for i in 0..options.samples {
        let v = generator.next(i);
        let value = if options.missing_ratio > 0.0 && gaps.gen::<f64>() < options.missing_ratio {
            None
        } else {
            Some(v)
        };
        series.append(t, value);
        t += options.interval;
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_shape() {
        let options = GeneratorOptions {
            samples: 500,
            range: 10.0..20.0,
            missing_ratio: 0.1,
            ..Default::default()
        };
        let series = generate_series_data(&options).unwrap();
        assert_eq!(series.len(), 500);
        assert!(series.present_count() < 500);
        assert!(series.present_values().all(|v| (10.0..20.0).contains(&v)));
        assert_eq!(series.time_span(), Duration::hours(499));
    }

    #[test]
    fn seeded_generation_is_repeatable() {
        let options = GeneratorOptions { typ: RandAlgo::Hydrograph, ..Default::default() };
        let a = generate_series_data(&options).unwrap();
        let b = generate_series_data(&options).unwrap();
        assert_eq!(a, b);
    }
}
