use serde::{Deserialize, Serialize};

use crate::common::types::{SampleValue, Timestamp};
use crate::error::{TsError, TsResult};
use crate::series::{DuplicatePolicy, TimeSeriesData};

/// A series where every sample also carries an optional quality flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FlaggedParts<T, F>")]
pub struct TimeSeriesDataWFlag<T, F> {
    pub(crate) timestamps: Vec<Timestamp>,
    pub(crate) values: Vec<Option<T>>,
    pub(crate) flags: Vec<Option<F>>,
}

#[derive(Deserialize)]
struct FlaggedParts<T, F> {
    timestamps: Vec<Timestamp>,
    values: Vec<Option<T>>,
    flags: Vec<Option<F>>,
}

impl<T, F> TryFrom<FlaggedParts<T, F>> for TimeSeriesDataWFlag<T, F> {
    type Error = TsError;

    fn try_from(parts: FlaggedParts<T, F>) -> Result<Self, Self::Error> {
        let FlaggedParts { timestamps, values, flags } = parts;
        if timestamps.len() != values.len() {
            return Err(TsError::InvalidSize(timestamps.len(), values.len()));
        }
        if timestamps.len() != flags.len() {
            return Err(TsError::InvalidSize(timestamps.len(), flags.len()));
        }
        Ok(Self { timestamps, values, flags })
    }
}

impl<T, F> Default for TimeSeriesDataWFlag<T, F> {
    fn default() -> Self {
        Self { timestamps: vec![], values: vec![], flags: vec![] }
    }
}

impl<T: SampleValue, F: Clone> TimeSeriesDataWFlag<T, F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vecs(
        timestamps: Vec<Timestamp>,
        values: Vec<Option<T>>,
        flags: Vec<Option<F>>,
    ) -> TsResult<Self> {
        if timestamps.len() != values.len() {
            return Err(TsError::InvalidSize(timestamps.len(), values.len()));
        }
        if timestamps.len() != flags.len() {
            return Err(TsError::InvalidSize(timestamps.len(), flags.len()));
        }
        Ok(Self { timestamps, values, flags })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn values(&self) -> &[Option<T>] {
        &self.values
    }

    pub fn flags(&self) -> &[Option<F>] {
        &self.flags
    }

    pub fn append(&mut self, ts: Timestamp, value: Option<T>, flag: Option<F>) {
        self.timestamps.push(ts);
        self.values.push(value);
        self.flags.push(flag);
    }

    /// Sorted insert. On an existing timestamp the value is resolved with `policy`
    /// (default `KeepLast`) and the flag is replaced unless the policy kept the old sample.
    pub fn insert(
        &mut self,
        ts: Timestamp,
        value: Option<T>,
        flag: Option<F>,
        policy: Option<DuplicatePolicy>,
    ) -> TsResult<usize> {
        match self.timestamps.binary_search(&ts) {
            Ok(pos) => {
                let dp = policy.unwrap_or(DuplicatePolicy::KeepLast);
                self.values[pos] = dp.value_on_duplicate(ts, self.values[pos], value)?;
                if dp != DuplicatePolicy::KeepFirst {
                    self.flags[pos] = flag;
                }
                Ok(0)
            }
            Err(idx) => {
                self.timestamps.insert(idx, ts);
                self.values.insert(idx, value);
                self.flags.insert(idx, flag);
                Ok(1)
            }
        }
    }

    /// Drops the flags.
    pub fn to_series(&self) -> TimeSeriesData<T> {
        TimeSeriesData {
            timestamps: self.timestamps.clone(),
            values: self.values.clone(),
        }
    }
}
