use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::common::types::Timestamp;

/// A single sample. A `None` value marks a missing observation, which is distinct from zero.
///
/// Equality compares both fields. Use [`ByTimestamp`] when points must be ordered or
/// deduplicated by time alone.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DataPoint<T> {
    pub timestamp: Timestamp,
    pub value: Option<T>,
}

impl<T> DataPoint<T> {
    pub fn new(timestamp: Timestamp, value: Option<T>) -> Self {
        DataPoint { timestamp, value }
    }

    pub fn missing(timestamp: Timestamp) -> Self {
        DataPoint { timestamp, value: None }
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }
}

impl<T> From<(Timestamp, T)> for DataPoint<T> {
    fn from((timestamp, value): (Timestamp, T)) -> Self {
        DataPoint { timestamp, value: Some(value) }
    }
}

/// Ordering key that compares data points by timestamp only.
///
/// Two points with the same timestamp and different values are *equal* under this key,
/// so a `BTreeSet<ByTimestamp<T>>` keeps exactly one sample per instant (the first one
/// inserted).
#[derive(Debug, Clone, Copy)]
pub struct ByTimestamp<T>(pub DataPoint<T>);

impl<T> ByTimestamp<T> {
    pub fn into_inner(self) -> DataPoint<T> {
        self.0
    }
}

impl<T> PartialEq for ByTimestamp<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.timestamp == other.0.timestamp
    }
}

impl<T> Eq for ByTimestamp<T> {}

impl<T> Ord for ByTimestamp<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.timestamp.cmp(&other.0.timestamp)
    }
}

impl<T> PartialOrd for ByTimestamp<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
