//! Interchangeable first-crossing kernels.
//!
//! A kernel fills an H*W output buffer from an N*H*W frame buffer. The
//! portable kernel performs one whole-grid comparison per frame; the
//! parallel kernel partitions the output by row across the rayon pool and
//! walks each row through time. The kernel is picked once from
//! configuration and never swapped afterwards.

use super::NOT_CROSSED;
use crate::error::AnalysisError;
use crate::sequence::SequenceDims;
use ndarray::{aview1, aview_mut1, Zip};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Flat-buffer contract every first-crossing implementation honors.
///
/// `frames` holds `dims.frames` row-major frames back to back; `out` holds
/// one row-major grid. On success every cell of `out` is either
/// [`NOT_CROSSED`] or `t / frame_rate` for the first `t` at which the pixel
/// reached `threshold`.
pub trait CrossingKernel: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Fills `out` with first-crossing times.
    fn fill(
        &self,
        frames: &[f64],
        out: &mut [f64],
        dims: SequenceDims,
        threshold: f64,
        frame_rate: f64,
    ) -> Result<(), AnalysisError>;
}

/// Selects which kernel a reducer uses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Sequential whole-grid passes.
    #[default]
    Portable,
    /// Row-partitioned passes across the rayon thread pool.
    Parallel,
}

impl Backend {
    /// Instantiates the kernel for this backend.
    pub fn kernel(self) -> Box<dyn CrossingKernel> {
        match self {
            Self::Portable => Box::new(PortableKernel),
            Self::Parallel => Box::new(ParallelKernel),
        }
    }
}

fn check_inputs(
    frames: &[f64],
    out: &[f64],
    dims: SequenceDims,
    threshold: f64,
    frame_rate: f64,
) -> Result<(), AnalysisError> {
    // t = 0 divided by a zero rate would land on the sentinel
    if !frame_rate.is_finite() || frame_rate <= 0.0 {
        return Err(AnalysisError::InvalidFrameRate(frame_rate));
    }
    if threshold.is_nan() {
        return Err(AnalysisError::InvalidParameter {
            name: "threshold",
            reason: "must not be NaN".into(),
        });
    }
    if dims.frames == 0 {
        return Err(AnalysisError::EmptyInput);
    }
    if dims.rows == 0 || dims.cols == 0 {
        return Err(AnalysisError::shape(format!(
            "frames must be non-empty 2-D grids, got {}x{}",
            dims.rows, dims.cols
        )));
    }
    if frames.len() != dims.sample_count() {
        return Err(AnalysisError::shape(format!(
            "frame buffer holds {} samples, expected {}",
            frames.len(),
            dims.sample_count()
        )));
    }
    if out.len() != dims.pixel_count() {
        return Err(AnalysisError::shape(format!(
            "output buffer holds {} cells, expected {}",
            out.len(),
            dims.pixel_count()
        )));
    }
    Ok(())
}

/// Sequential kernel: one whole-grid masked assignment per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortableKernel;

impl CrossingKernel for PortableKernel {
    fn name(&self) -> &'static str {
        "portable"
    }

    fn fill(
        &self,
        frames: &[f64],
        out: &mut [f64],
        dims: SequenceDims,
        threshold: f64,
        frame_rate: f64,
    ) -> Result<(), AnalysisError> {
        check_inputs(frames, out, dims, threshold, frame_rate)?;

        out.fill(NOT_CROSSED);
        let mut grid = aview_mut1(out);
        for (t, frame) in frames.chunks_exact(dims.pixel_count()).enumerate() {
            let time = t as f64 / frame_rate;
            Zip::from(&mut grid)
                .and(&aview1(frame))
                .for_each(|cell, &px| {
                    if cell.is_nan() && px >= threshold {
                        *cell = time;
                    }
                });
        }
        Ok(())
    }
}

/// Data-parallel kernel.
///
/// Pixels are independent within a frame, so each output row is owned by
/// exactly one task which visits frames in increasing time order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelKernel;

impl CrossingKernel for ParallelKernel {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn fill(
        &self,
        frames: &[f64],
        out: &mut [f64],
        dims: SequenceDims,
        threshold: f64,
        frame_rate: f64,
    ) -> Result<(), AnalysisError> {
        check_inputs(frames, out, dims, threshold, frame_rate)?;

        let plane = dims.pixel_count();
        out.par_chunks_mut(dims.cols)
            .enumerate()
            .for_each(|(row, cells)| {
                cells.fill(NOT_CROSSED);
                let offset = row * dims.cols;
                for t in 0..dims.frames {
                    let start = t * plane + offset;
                    let samples = &frames[start..start + dims.cols];
                    let time = t as f64 / frame_rate;
                    for (cell, &px) in cells.iter_mut().zip(samples) {
                        if cell.is_nan() && px >= threshold {
                            *cell = time;
                        }
                    }
                }
            });
        Ok(())
    }
}
