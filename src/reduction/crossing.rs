//! First-passage-time reduction.
//!
//! For every pixel, the danger matrix records the elapsed time at which its
//! intensity first reached the threshold. Pixels that never get there keep
//! the [`NOT_CROSSED`] sentinel, which lies outside every legitimate time so
//! "never crossed" cannot be confused with "crossed at t = 0".

use super::kernel::{Backend, CrossingKernel};
use super::NOT_CROSSED;
use crate::error::AnalysisError;
use crate::sequence::FrameSequence;
use ndarray::{Array2, ArrayView2, Zip};
use serde::Serialize;

/// Per-pixel first-crossing times, shape (H, W).
#[derive(Debug, Clone, Serialize)]
pub struct DangerMatrix {
    times: Array2<f64>,
}

impl DangerMatrix {
    /// Wraps a grid of crossing times; NaN cells mean "never crossed".
    pub fn from_times(times: Array2<f64>) -> Self {
        Self { times }
    }

    /// The raw grid, sentinel cells included.
    #[inline]
    pub fn times(&self) -> &Array2<f64> {
        &self.times
    }

    /// Shape (H, W).
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.times.dim()
    }

    /// Crossing time of the pixel at (`row`, `col`), `None` if it never
    /// crossed or lies outside the grid.
    pub fn value_at(&self, row: usize, col: usize) -> Option<f64> {
        self.times.get((row, col)).copied().filter(|v| !v.is_nan())
    }

    /// Number of pixels that crossed the threshold.
    pub fn crossed_count(&self) -> usize {
        self.times.iter().filter(|v| !v.is_nan()).count()
    }

    /// Fraction of pixels that crossed, in [0, 1].
    pub fn crossed_fraction(&self) -> f64 {
        if self.times.is_empty() {
            return 0.0;
        }
        self.crossed_count() as f64 / self.times.len() as f64
    }

    /// True if no pixel ever left the sentinel.
    pub fn is_uniformly_unset(&self) -> bool {
        self.times.iter().all(|v| v.is_nan())
    }

    /// Consumes the matrix and returns its grid.
    pub fn into_inner(self) -> Array2<f64> {
        self.times
    }
}

/// Caller-level check that a danger matrix carries at least one crossing.
pub fn check_crossings(danger: &DangerMatrix) -> Result<(), AnalysisError> {
    if danger.is_uniformly_unset() {
        return Err(AnalysisError::AllZeroResult);
    }
    Ok(())
}

fn check_threshold(threshold: f64) -> Result<(), AnalysisError> {
    if threshold.is_nan() {
        return Err(AnalysisError::InvalidParameter {
            name: "threshold",
            reason: "must not be NaN".into(),
        });
    }
    Ok(())
}

/// Computes danger matrices through a configured kernel.
pub struct ThresholdCrossingReducer {
    threshold: f64,
    kernel: Box<dyn CrossingKernel>,
}

impl ThresholdCrossingReducer {
    /// Creates a reducer using the portable kernel.
    pub fn new(threshold: f64) -> Self {
        Self::with_backend(threshold, Backend::Portable)
    }

    /// Creates a reducer using the kernel of `backend`.
    pub fn with_backend(threshold: f64, backend: Backend) -> Self {
        Self::with_kernel(threshold, backend.kernel())
    }

    /// Creates a reducer around an externally supplied kernel.
    pub fn with_kernel(threshold: f64, kernel: Box<dyn CrossingKernel>) -> Self {
        Self { threshold, kernel }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Name of the kernel in use.
    pub fn kernel_name(&self) -> &'static str {
        self.kernel.name()
    }

    /// Reduces a sequence to its danger matrix.
    pub fn reduce(&self, sequence: &FrameSequence) -> Result<DangerMatrix, AnalysisError> {
        if sequence.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        check_threshold(self.threshold)?;

        let dims = sequence.dims();
        let frames = sequence
            .as_slice()
            .ok_or_else(|| AnalysisError::shape("frame buffer is not contiguous"))?;

        let mut out = vec![NOT_CROSSED; dims.pixel_count()];
        self.kernel.fill(
            frames,
            &mut out,
            dims,
            self.threshold,
            sequence.frame_rate(),
        )?;

        let times = Array2::from_shape_vec((dims.rows, dims.cols), out)
            .map_err(|e| AnalysisError::shape(e.to_string()))?;
        let danger = DangerMatrix { times };

        tracing::debug!(
            kernel = self.kernel.name(),
            frames = dims.frames,
            rows = dims.rows,
            cols = dims.cols,
            crossed = danger.crossed_count(),
            "Danger matrix computed"
        );
        Ok(danger)
    }
}

/// Incremental form of the first-crossing reduction.
///
/// Frames are pushed one at a time in increasing time order, which lets a
/// driver check for cancellation between frames.
#[derive(Debug, Clone)]
pub struct CrossingAccumulator {
    times: Array2<f64>,
    threshold: f64,
    frame_rate: f64,
    frames_seen: usize,
}

impl CrossingAccumulator {
    /// Starts an accumulation over frames of shape (`rows`, `cols`).
    pub fn new(
        shape: (usize, usize),
        threshold: f64,
        frame_rate: f64,
    ) -> Result<Self, AnalysisError> {
        if shape.0 == 0 || shape.1 == 0 {
            return Err(AnalysisError::shape(format!(
                "frames must be non-empty 2-D grids, got {}x{}",
                shape.0, shape.1
            )));
        }
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(AnalysisError::InvalidFrameRate(frame_rate));
        }
        check_threshold(threshold)?;

        Ok(Self {
            times: Array2::from_elem(shape, NOT_CROSSED),
            threshold,
            frame_rate,
            frames_seen: 0,
        })
    }

    /// Folds in the next frame; returns how many pixels crossed in it.
    pub fn push(&mut self, frame: ArrayView2<'_, f64>) -> Result<usize, AnalysisError> {
        if frame.dim() != self.times.dim() {
            return Err(AnalysisError::shape(format!(
                "frame {} is {:?}, expected {:?}",
                self.frames_seen,
                frame.dim(),
                self.times.dim()
            )));
        }

        let time = self.frames_seen as f64 / self.frame_rate;
        let threshold = self.threshold;
        let mut crossed = 0;
        Zip::from(&mut self.times)
            .and(&frame)
            .for_each(|cell, &px| {
                if cell.is_nan() && px >= threshold {
                    *cell = time;
                    crossed += 1;
                }
            });

        self.frames_seen += 1;
        Ok(crossed)
    }

    /// Frames folded in so far.
    pub fn frames_seen(&self) -> usize {
        self.frames_seen
    }

    /// Finishes the accumulation.
    pub fn finish(self) -> Result<DangerMatrix, AnalysisError> {
        if self.frames_seen == 0 {
            return Err(AnalysisError::EmptyInput);
        }
        Ok(DangerMatrix { times: self.times })
    }
}
