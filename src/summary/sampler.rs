//! Representative pixel selection and intensity traces.
//!
//! Two pixel sets are drawn from a reference matrix: the *typical* set,
//! every location holding the matrix's modal value, and the *extreme* set,
//! every location holding its maximum. Each set is then traced through the
//! sequence as a per-frame mean intensity, saturated at a clip threshold.
//!
//! The modal value is derived from the distribution of cell values first;
//! locations are gathered in a second, separate pass.

use super::ReferenceGrid;
use crate::error::AnalysisError;
use crate::sequence::FrameSequence;
use ndarray::ArrayView2;
use rayon::prelude::*;
use serde::Serialize;

/// A pixel location as (row, col).
pub type PixelLocation = (usize, usize);

/// Mean intensity of a pixel set, frame by frame.
#[derive(Debug, Clone, Serialize)]
pub struct RepresentativeTrace {
    /// Reference-matrix value shared by every member pixel.
    reference_value: f64,
    /// Member pixel locations in row-major order.
    pixels: Vec<PixelLocation>,
    /// One clipped mean per frame.
    values: Vec<f64>,
}

impl RepresentativeTrace {
    pub fn reference_value(&self) -> f64 {
        self.reference_value
    }

    pub fn pixels(&self) -> &[PixelLocation] {
        &self.pixels
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Traces for the typical and the extreme pixel set.
#[derive(Debug, Clone, Serialize)]
pub struct TracePair {
    pub typical: RepresentativeTrace,
    pub extreme: RepresentativeTrace,
}

/// Selects representative pixels and extracts their traces.
#[derive(Debug, Clone, Copy)]
pub struct DistributionSampler {
    clip_threshold: f64,
}

impl DistributionSampler {
    pub fn new(clip_threshold: f64) -> Self {
        Self { clip_threshold }
    }

    pub fn clip_threshold(&self) -> f64 {
        self.clip_threshold
    }

    /// Builds the typical and extreme traces of `sequence` under `reference`.
    ///
    /// Each trace has one value per frame. A sequence with no frames is
    /// rejected with [`AnalysisError::EmptyInput`] rather than yielding two
    /// empty traces, matching the first-crossing reducer.
    pub fn sample<R>(
        &self,
        sequence: &FrameSequence,
        reference: &R,
    ) -> Result<TracePair, AnalysisError>
    where
        R: ReferenceGrid + ?Sized,
    {
        let grid = reference.grid();
        if grid.is_empty() {
            return Err(AnalysisError::shape("reference matrix is empty"));
        }
        if sequence.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        if grid.dim() != sequence.frame_shape() {
            return Err(AnalysisError::shape(format!(
                "reference matrix is {:?}, frames are {:?}",
                grid.dim(),
                sequence.frame_shape()
            )));
        }
        if self.clip_threshold.is_nan() {
            return Err(AnalysisError::InvalidParameter {
                name: "clip_threshold",
                reason: "must not be NaN".into(),
            });
        }

        let mode = modal_value(grid).ok_or(AnalysisError::AllZeroResult)?;
        let max = maximum_value(grid).ok_or(AnalysisError::AllZeroResult)?;

        let typical = self.trace(sequence, mode, locations_of(grid, mode));
        let extreme = self.trace(sequence, max, locations_of(grid, max));

        tracing::debug!(
            mode,
            typical_pixels = typical.pixels.len(),
            max,
            extreme_pixels = extreme.pixels.len(),
            "Representative pixels selected"
        );
        Ok(TracePair { typical, extreme })
    }

    fn trace(
        &self,
        sequence: &FrameSequence,
        reference_value: f64,
        pixels: Vec<PixelLocation>,
    ) -> RepresentativeTrace {
        let count = pixels.len() as f64;
        let values = (0..sequence.len())
            .into_par_iter()
            .map(|t| {
                let frame = sequence.frame(t);
                let mean = pixels.iter().map(|&loc| frame[loc]).sum::<f64>() / count;
                mean.min(self.clip_threshold)
            })
            .collect();

        RepresentativeTrace {
            reference_value,
            pixels,
            values,
        }
    }
}

/// Most frequent finite value of `grid`; ties go to the smallest value.
///
/// Returns `None` if the grid has no finite cell.
pub(crate) fn modal_value(grid: ArrayView2<'_, f64>) -> Option<f64> {
    let mut values: Vec<f64> = grid
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        // fold -0.0 into 0.0 so both count as one value
        .map(|v| if v == 0.0 { 0.0 } else { v })
        .collect();
    values.sort_unstable_by(f64::total_cmp);

    let mut best: Option<(f64, usize)> = None;
    for run in values.chunk_by(|a, b| a == b) {
        if best.map_or(true, |(_, count)| run.len() > count) {
            best = Some((run[0], run.len()));
        }
    }
    best.map(|(value, _)| value)
}

/// Largest finite value of `grid`.
pub(crate) fn maximum_value(grid: ArrayView2<'_, f64>) -> Option<f64> {
    grid.iter()
        .copied()
        .filter(|v| v.is_finite())
        .reduce(f64::max)
}

/// Every location whose value equals `value`, in row-major order.
pub(crate) fn locations_of(grid: ArrayView2<'_, f64>, value: f64) -> Vec<PixelLocation> {
    grid.indexed_iter()
        .filter(|&(_, &v)| v == value)
        .map(|(loc, _)| loc)
        .collect()
}
