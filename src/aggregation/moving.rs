use std::collections::VecDeque;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::aggregation::AggregationType;
use crate::common::time::validate_step;
use crate::common::types::{SampleValue, Timestamp};
use crate::error::{TsError, TsResult};
use crate::series::TimeSeriesData;

/// Where a time-span window sits relative to the sample it is computed for.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum WindowAlignment {
    /// `[t - span, t]`
    #[default]
    Backwards,
    /// `[t, t + span]`
    Forward,
    /// `[t - span/2, t + span/2]`
    Middle,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MovingWindow {
    /// The current point and the `n - 1` points before it. Output starts at the first
    /// full window.
    Count(usize),
    /// All points within a time span around the current point, bounds inclusive.
    Span { span: Duration, alignment: WindowAlignment },
}

/// Running aggregate over a window whose bounds only ever move forward.
///
/// Extrema are tracked with monotonic deques of indices, so each point is pushed and
/// evicted once.
struct SlidingWindow<'a, T> {
    values: &'a [Option<T>],
    kind: AggregationType,
    sum: T,
    count: usize,
    min_queue: VecDeque<usize>,
    max_queue: VecDeque<usize>,
}

impl<'a, T: SampleValue> SlidingWindow<'a, T> {
    fn new(values: &'a [Option<T>], kind: AggregationType) -> Self {
        Self {
            values,
            kind,
            sum: T::zero(),
            count: 0,
            min_queue: VecDeque::new(),
            max_queue: VecDeque::new(),
        }
    }

    fn push(&mut self, idx: usize) {
        let Some(value) = self.values[idx] else {
            return;
        };
        match self.kind {
            AggregationType::Sum | AggregationType::Average => {
                self.sum = self.sum + value;
                self.count += 1;
            }
            AggregationType::Minimum => {
                while let Some(&back) = self.min_queue.back() {
                    if self.value(back) >= value {
                        self.min_queue.pop_back();
                    } else {
                        break;
                    }
                }
                self.min_queue.push_back(idx);
            }
            AggregationType::Maximum => {
                while let Some(&back) = self.max_queue.back() {
                    if self.value(back) <= value {
                        self.max_queue.pop_back();
                    } else {
                        break;
                    }
                }
                self.max_queue.push_back(idx);
            }
        }
    }

    fn evict(&mut self, idx: usize) {
        let Some(value) = self.values[idx] else {
            return;
        };
        match self.kind {
            AggregationType::Sum | AggregationType::Average => {
                self.sum = self.sum - value;
                self.count -= 1;
                if self.count == 0 {
                    // drop accumulated rounding error
                    self.sum = T::zero();
                }
            }
            AggregationType::Minimum => {
                if self.min_queue.front() == Some(&idx) {
                    self.min_queue.pop_front();
                }
            }
            AggregationType::Maximum => {
                if self.max_queue.front() == Some(&idx) {
                    self.max_queue.pop_front();
                }
            }
        }
    }

    fn value(&self, idx: usize) -> T {
        self.values[idx].unwrap_or_else(T::nan)
    }

    fn current(&self) -> Option<T> {
        match self.kind {
            AggregationType::Sum | AggregationType::Average if self.count == 0 => self.kind.empty_value(),
            AggregationType::Sum => Some(self.sum),
            AggregationType::Average => Some(self.sum / T::from_count(self.count)),
            AggregationType::Minimum => self.min_queue.front().map(|&i| self.value(i)),
            AggregationType::Maximum => self.max_queue.front().map(|&i| self.value(i)),
        }
    }
}

impl<T: SampleValue> TimeSeriesData<T> {
    pub fn moving_aggregate(&self, kind: AggregationType, window: MovingWindow) -> TsResult<TimeSeriesData<T>> {
        match window {
            MovingWindow::Count(n) => self.moving_by_count(kind, n),
            MovingWindow::Span { span, alignment } => self.moving_by_span(kind, span, alignment),
        }
    }

    pub fn moving_average(&self, window: MovingWindow) -> TsResult<TimeSeriesData<T>> {
        self.moving_aggregate(AggregationType::Average, window)
    }

    pub fn moving_minimum(&self, window: MovingWindow) -> TsResult<TimeSeriesData<T>> {
        self.moving_aggregate(AggregationType::Minimum, window)
    }

    pub fn moving_maximum(&self, window: MovingWindow) -> TsResult<TimeSeriesData<T>> {
        self.moving_aggregate(AggregationType::Maximum, window)
    }

    fn moving_by_count(&self, kind: AggregationType, n: usize) -> TsResult<TimeSeriesData<T>> {
        if n == 0 {
            return Err(TsError::InvalidArgument("moving window must hold at least one point".to_string()));
        }
        let len = self.len();
        if len < n {
            return Ok(TimeSeriesData::new());
        }

        let mut res = TimeSeriesData::with_capacity(len - n + 1);
        let mut window = SlidingWindow::new(&self.values, kind);
        for i in 0..len {
            window.push(i);
            if i + 1 < n {
                continue;
            }
            if i >= n {
                window.evict(i - n);
            }
            res.append(self.timestamps[i], window.current());
        }
        Ok(res)
    }

    fn moving_by_span(
        &self,
        kind: AggregationType,
        span: Duration,
        alignment: WindowAlignment,
    ) -> TsResult<TimeSeriesData<T>> {
        validate_step(span)?;
        self.require_sorted()?;

        // saturate at the representable range so very long spans cover the whole series
        let minus = |t: Timestamp, d: Duration| t.checked_sub_signed(d).unwrap_or(NaiveDateTime::MIN);
        let plus = |t: Timestamp, d: Duration| t.checked_add_signed(d).unwrap_or(NaiveDateTime::MAX);
        let bounds = |t: Timestamp| -> (Timestamp, Timestamp) {
            match alignment {
                WindowAlignment::Backwards => (minus(t, span), t),
                WindowAlignment::Forward => (t, plus(t, span)),
                WindowAlignment::Middle => (minus(t, span / 2), plus(t, span / 2)),
            }
        };

        let len = self.len();
        let mut res = TimeSeriesData::with_capacity(len);
        let mut window = SlidingWindow::new(&self.values, kind);
        // window covers indices lo..hi
        let mut lo = 0;
        let mut hi = 0;
        for i in 0..len {
            let (start, end) = bounds(self.timestamps[i]);
            while hi < len && self.timestamps[hi] <= end {
                window.push(hi);
                hi += 1;
            }
            while lo < hi && self.timestamps[lo] < start {
                window.evict(lo);
                lo += 1;
            }
            res.append(self.timestamps[i], window.current());
        }
        Ok(res)
    }
}
