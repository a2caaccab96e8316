use crate::common::types::Timestamp;
use crate::error::{TsError, TsResult};

pub(crate) fn ensure_ascending(timestamps: &[Timestamp]) -> TsResult<()> {
    if timestamps.windows(2).all(|w| w[0] < w[1]) {
        Ok(())
    } else {
        Err(TsError::InvalidTimestamp(
            "timestamps must be strictly ascending".to_string(),
        ))
    }
}

/// Returns the index of the first timestamp that is greater than or equal to `start_ts`.
pub(crate) fn get_timestamp_index(timestamps: &[Timestamp], start_ts: Timestamp) -> Option<usize> {
    if timestamps.is_empty() {
        return None;
    }

    let min_timestamp = timestamps[0];
    let max_timestamp = timestamps[timestamps.len() - 1];
    if max_timestamp < start_ts {
        // Out of range.
        return None;
    }

    let idx = if start_ts <= min_timestamp {
        0
    } else {
        timestamps.partition_point(|ts| *ts < start_ts)
    };

    Some(idx)
}

/// Returns the half-open index range `[start, end)` of timestamps within `start_ts..=end_ts`.
pub(crate) fn get_timestamp_index_bounds(
    timestamps: &[Timestamp],
    start_ts: Timestamp,
    end_ts: Timestamp,
) -> Option<(usize, usize)> {
    if timestamps.is_empty() || start_ts > end_ts {
        return None;
    }

    let min_timestamp = timestamps[0];
    let max_timestamp = timestamps[timestamps.len() - 1];
    if min_timestamp > end_ts || max_timestamp < start_ts {
        // Out of range.
        return None;
    }

    let start_idx = if start_ts <= min_timestamp {
        0
    } else {
        timestamps.partition_point(|ts| *ts < start_ts)
    };

    let end_idx = if end_ts >= max_timestamp {
        timestamps.len()
    } else {
        start_idx + timestamps[start_idx..].partition_point(|ts| *ts <= end_ts)
    };

    Some((start_idx, end_idx))
}

/// Perpendicular distance of `(x0, y0)` from the line through `(x1, y1)` and `(x2, y2)`.
/// Falls back to the point distance when both line points coincide.
pub(crate) fn perpendicular_distance(x0: f64, y0: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let norm = (dx * dx + dy * dy).sqrt();
    if norm == 0.0 {
        return ((x0 - x1).powi(2) + (y0 - y1).powi(2)).sqrt();
    }
    (dy * x0 - dx * y0 + x2 * y1 - y2 * x1).abs() / norm
}
