use std::fmt::Debug;

use num_traits::{Float, FromPrimitive};

pub type Timestamp = chrono::NaiveDateTime;

/// Numeric type that can be stored as a sample value.
///
/// Resolved at compile time per concrete type (`f32`, `f64`), so aggregation and the
/// numeric transforms never dispatch on the value type at runtime.
pub trait SampleValue: Float + FromPrimitive + Debug + Send + Sync + 'static {
    /// Lossless widening used by the f64-based numeric kernels.
    #[inline]
    fn as_f64(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }

    #[inline]
    fn from_f64_lossy(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).unwrap_or_else(Self::nan)
    }

    #[inline]
    fn from_count(n: usize) -> Self {
        <Self as FromPrimitive>::from_usize(n).unwrap_or_else(Self::nan)
    }
}

impl<T> SampleValue for T where T: Float + FromPrimitive + Debug + Send + Sync + 'static {}
