//! Fork-join helpers used by reduction and smoothing.
//!
//! Long inputs are cut into disjoint, fixed-size index ranges that are processed on the
//! rayon pool without any cross-chunk communication. Callers block until every chunk is
//! done.

use std::ops::Range;

use rayon::prelude::*;
use tracing::debug;

use crate::config::AnalysisSettings;

/// Index ranges of at most `chunk_size` points covering `0..len`.
pub(crate) fn chunk_ranges(len: usize, chunk_size: usize) -> Vec<Range<usize>> {
    let chunk_size = chunk_size.max(1);
    (0..len)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(len))
        .collect()
}

pub(crate) fn should_parallelize(len: usize, settings: &AnalysisSettings) -> bool {
    len > settings.parallel_threshold
}

/// Runs `f` over each chunk range and concatenates the outputs in chunk order.
/// Inputs at or below the parallel threshold are handled as a single range.
pub(crate) fn map_chunks<R, F>(len: usize, settings: &AnalysisSettings, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(Range<usize>) -> Vec<R> + Send + Sync,
{
    if !should_parallelize(len, settings) {
        return f(0..len);
    }
    let ranges = chunk_ranges(len, settings.chunk_size);
    debug!(len, chunks = ranges.len(), "processing series in parallel chunks");
    ranges
        .into_par_iter()
        .map(f)
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

/// Fills `output` in place. Each worker receives the offset of its slice within `output`
/// and writes only to that slice.
pub(crate) fn fill_chunks<R, F>(output: &mut [R], settings: &AnalysisSettings, f: F)
where
    R: Send,
    F: Fn(usize, &mut [R]) + Send + Sync,
{
    let len = output.len();
    if !should_parallelize(len, settings) {
        f(0, output);
        return;
    }
    let chunk_size = settings.chunk_size.max(1);
    debug!(len, chunks = len.div_ceil(chunk_size), "filling output in parallel chunks");
    output
        .par_chunks_mut(chunk_size)
        .enumerate()
        .for_each(|(i, chunk)| f(i * chunk_size, chunk));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_chunks() -> AnalysisSettings {
        AnalysisSettings {
            parallel_threshold: 20,
            chunk_size: 10,
            ..Default::default()
        }
    }

    #[test]
    fn chunk_ranges_cover_input() {
        let ranges = chunk_ranges(25, 10);
        assert_eq!(ranges, vec![0..10, 10..20, 20..25]);
        assert!(chunk_ranges(0, 10).is_empty());
    }

    #[test]
    fn map_chunks_preserves_order() {
        let settings = small_chunks();
        let res = map_chunks(45, &settings, |r| r.collect::<Vec<_>>());
        assert_eq!(res, (0..45).collect::<Vec<_>>());

        // below the threshold the whole range is handled at once
        let res = map_chunks(15, &settings, |r| vec![r]);
        assert_eq!(res, vec![0..15]);
    }

    #[test]
    fn fill_chunks_writes_disjoint_slices() {
        let settings = small_chunks();
        let mut output = vec![0usize; 33];
        fill_chunks(&mut output, &settings, |offset, chunk| {
            for (i, v) in chunk.iter_mut().enumerate() {
                *v = offset + i;
            }
        });
        assert_eq!(output, (0..33).collect::<Vec<_>>());
    }
}
