//! Value histograms of a reference matrix.
//!
//! Edges are spaced linearly from 0 to the matrix maximum. Every interval is
//! half-open except the last, which also includes its right edge, so the
//! maximum itself is always counted.

use super::ReferenceGrid;
use crate::error::AnalysisError;
use rayon::prelude::*;
use serde::Serialize;

/// Bin counts over strictly increasing edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    counts: Vec<u64>,
    edges: Vec<f64>,
}

impl Histogram {
    /// One count per interval; `edges().len() - 1` entries.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Number of intervals.
    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// A histogram together with the inputs it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct HistogramOutput {
    pub histogram: Histogram,
    /// The reference matrix flattened row-major, unfiltered.
    pub samples: Vec<f64>,
    /// The edge sequence the samples were binned against.
    pub raw_edges: Vec<f64>,
}

/// Bins reference-matrix values into a frequency distribution.
#[derive(Debug, Clone, Copy)]
pub struct HistogramBinner {
    edge_count: usize,
}

impl HistogramBinner {
    /// `edge_count` edges produce `edge_count - 1` bins; fewer than two
    /// edges is rejected when binning.
    pub fn new(edge_count: usize) -> Self {
        Self { edge_count }
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Bins the values of `reference`.
    pub fn bin<R>(&self, reference: &R) -> Result<HistogramOutput, AnalysisError>
    where
        R: ReferenceGrid + ?Sized,
    {
        if self.edge_count < 2 {
            return Err(AnalysisError::DegenerateHistogram(format!(
                "{} edges bound no bins; at least two are required",
                self.edge_count
            )));
        }

        let grid = reference.grid();
        if grid.is_empty() {
            return Err(AnalysisError::DegenerateHistogram(
                "reference matrix is empty".into(),
            ));
        }

        let samples: Vec<f64> = grid.iter().copied().collect();
        let max = samples
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .reduce(f64::max)
            .ok_or_else(|| {
                AnalysisError::DegenerateHistogram("reference matrix has no finite values".into())
            })?;
        if max <= 0.0 {
            return Err(AnalysisError::DegenerateHistogram(format!(
                "maximum value {max} leaves no positive range"
            )));
        }

        let edges = linspace(0.0, max, self.edge_count);
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AnalysisError::DegenerateHistogram(format!(
                "{} edges over [0, {max}] are not strictly increasing",
                self.edge_count
            )));
        }

        let bins = edges.len() - 1;
        let counts = samples
            .par_iter()
            .fold(
                || vec![0u64; bins],
                |mut counts, &v| {
                    if let Some(idx) = bin_index(v, &edges) {
                        counts[idx] += 1;
                    }
                    counts
                },
            )
            .reduce(
                || vec![0u64; bins],
                |mut a, b| {
                    a.iter_mut().zip(b).for_each(|(x, y)| *x += y);
                    a
                },
            );

        tracing::debug!(bins, max, samples = samples.len(), "Histogram binned");
        Ok(HistogramOutput {
            histogram: Histogram {
                counts,
                edges: edges.clone(),
            },
            samples,
            raw_edges: edges,
        })
    }
}

/// `n` values evenly spaced over [`start`, `stop`], both ends included.
///
/// `n == 1` yields `[start]`; `n == 0` yields an empty vector.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            out[n - 1] = stop;
            out
        }
    }
}

/// Interval holding `value`, or `None` if it lies outside the edges.
fn bin_index(value: f64, edges: &[f64]) -> Option<usize> {
    let bins = edges.len().checked_sub(1).filter(|&b| b > 0)?;
    let (lo, hi) = (edges[0], edges[bins]);
    if !(value >= lo && value <= hi) {
        return None;
    }
    if value == hi {
        return Some(bins - 1);
    }

    // Estimate from the uniform spacing, then settle against the edges.
    let mut idx = (((value - lo) / (hi - lo)) * bins as f64) as usize;
    idx = idx.min(bins - 1);
    while idx > 0 && value < edges[idx] {
        idx -= 1;
    }
    while idx + 1 < bins && value >= edges[idx + 1] {
        idx += 1;
    }
    Some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_linspace_endpoints() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(0.0, 3.0, 1), vec![0.0]);
        assert!(linspace(0.0, 3.0, 0).is_empty());
    }

    #[test]
    fn test_counts_half_open_with_closed_last_bin() {
        let reference = array![[0.0, 1.0, 2.0], [3.0, 4.0, 4.0]];
        let out = HistogramBinner::new(5).bin(&reference).unwrap();

        assert_eq!(out.histogram.edges(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(out.histogram.counts(), &[1, 1, 1, 3]);
        assert_eq!(out.samples, vec![0.0, 1.0, 2.0, 3.0, 4.0, 4.0]);
        assert_eq!(out.raw_edges, out.histogram.edges());
    }

    #[test]
    fn test_out_of_range_and_sentinel_samples_skipped() {
        let reference = array![[-2.0, f64::NAN], [0.5, 2.0]];
        let out = HistogramBinner::new(3).bin(&reference).unwrap();

        assert_eq!(out.histogram.counts(), &[1, 1]);
        assert_eq!(out.histogram.total(), 2);
        assert_eq!(out.samples.len(), 4);
    }

    #[test]
    fn test_single_edge_is_degenerate() {
        let reference = array![[1.0, 2.0]];
        assert!(matches!(
            HistogramBinner::new(1).bin(&reference),
            Err(AnalysisError::DegenerateHistogram(_))
        ));
    }

    #[test]
    fn test_two_edges_count_every_in_range_sample() {
        let reference = array![[0.0, 8.75, 3.0]];
        let out = HistogramBinner::new(2).bin(&reference).unwrap();

        assert_eq!(out.histogram.counts(), &[3]);
        assert_eq!(out.histogram.edges(), &[0.0, 8.75]);
    }

    #[test]
    fn test_all_zero_matrix_is_degenerate() {
        let reference = Array2::<f64>::zeros((4, 4));
        assert!(matches!(
            HistogramBinner::new(10).bin(&reference),
            Err(AnalysisError::DegenerateHistogram(_))
        ));
    }

    #[test]
    fn test_empty_and_unset_matrices_are_degenerate() {
        let empty = Array2::<f64>::zeros((0, 3));
        assert!(matches!(
            HistogramBinner::new(10).bin(&empty),
            Err(AnalysisError::DegenerateHistogram(_))
        ));

        let unset = Array2::from_elem((2, 2), f64::NAN);
        assert!(matches!(
            HistogramBinner::new(10).bin(&unset),
            Err(AnalysisError::DegenerateHistogram(_))
        ));
    }

    #[test]
    fn test_zero_edges_rejected() {
        let reference = array![[1.0]];
        assert!(matches!(
            HistogramBinner::new(0).bin(&reference),
            Err(AnalysisError::DegenerateHistogram(_))
        ));
    }

    #[test]
    fn test_bin_index_settles_on_edges() {
        let edges = linspace(0.0, 0.3, 4);
        // 0.1 and 0.2 are exact edges only up to rounding
        assert_eq!(bin_index(edges[1], &edges), Some(1));
        assert_eq!(bin_index(edges[2], &edges), Some(2));
        assert_eq!(bin_index(0.3, &edges), Some(2));
        assert_eq!(bin_index(0.31, &edges), None);
    }
}
