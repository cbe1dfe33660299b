//! Memory-resident frame sequence.
//!
//! All frames of a sequence live in one standard-layout (N, H, W) buffer so
//! reducers can walk the whole video as a flat slice or as per-frame views.

use super::Frame;
use crate::error::AnalysisError;
use ndarray::{Array3, ArrayD, ArrayView2, ArrayView3, Axis, Ix3};
use serde::{Deserialize, Serialize};

/// Shape descriptor of a frame sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceDims {
    /// Number of frames (N).
    pub frames: usize,
    /// Frame height (H).
    pub rows: usize,
    /// Frame width (W).
    pub cols: usize,
}

impl SequenceDims {
    pub fn new(frames: usize, rows: usize, cols: usize) -> Self {
        Self { frames, rows, cols }
    }

    /// Pixels in a single frame (H * W).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Samples in the whole sequence (N * H * W).
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.frames * self.pixel_count()
    }
}

/// An ordered, equally shaped collection of frames plus its frame rate.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    data: Array3<f64>,
    frame_rate: f64,
}

impl FrameSequence {
    /// Wraps an (N, H, W) buffer.
    ///
    /// Every sample must be a finite, non-negative intensity. Non-standard
    /// layouts are copied into row-major order.
    pub fn new(data: Array3<f64>, frame_rate: f64) -> Result<Self, AnalysisError> {
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(AnalysisError::InvalidFrameRate(frame_rate));
        }

        let (frames, rows, cols) = data.dim();
        if frames > 0 && (rows == 0 || cols == 0) {
            return Err(AnalysisError::shape(format!(
                "frames must be non-empty 2-D grids, got {rows}x{cols}"
            )));
        }

        if let Some(((frame, row, col), &value)) = data
            .indexed_iter()
            .find(|&(_, &v)| !(v.is_finite() && v >= 0.0))
        {
            return Err(AnalysisError::InvalidSample {
                frame,
                row,
                col,
                value,
            });
        }

        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };

        Ok(Self { data, frame_rate })
    }

    /// Stacks individual frames, which must all share one shape.
    pub fn from_frames(frames: Vec<Frame>, frame_rate: f64) -> Result<Self, AnalysisError> {
        let Some(first) = frames.first() else {
            return Self::new(Array3::zeros((0, 0, 0)), frame_rate);
        };

        let (rows, cols) = first.shape();
        let mut samples = Vec::with_capacity(frames.len() * rows * cols);
        for frame in &frames {
            if frame.shape() != (rows, cols) {
                return Err(AnalysisError::shape(format!(
                    "frame {} is {:?}, expected {:?}",
                    frame.index(),
                    frame.shape(),
                    (rows, cols)
                )));
            }
            samples.extend(frame.pixels().iter().copied());
        }

        let data = Array3::from_shape_vec((frames.len(), rows, cols), samples)
            .map_err(|e| AnalysisError::shape(e.to_string()))?;
        Self::new(data, frame_rate)
    }

    /// Accepts a dynamically shaped array; it must have exactly three axes.
    pub fn from_dyn(data: ArrayD<f64>, frame_rate: f64) -> Result<Self, AnalysisError> {
        let ndim = data.ndim();
        let data = data.into_dimensionality::<Ix3>().map_err(|_| {
            AnalysisError::shape(format!(
                "expected (frames, rows, cols), got {ndim} axes; frames must be 2-D"
            ))
        })?;
        Self::new(data, frame_rate)
    }

    /// Builds a sequence from a flat row-major 8-bit buffer.
    pub fn from_gray8(
        bytes: &[u8],
        dims: SequenceDims,
        frame_rate: f64,
    ) -> Result<Self, AnalysisError> {
        if bytes.len() != dims.sample_count() {
            return Err(AnalysisError::shape(format!(
                "buffer holds {} samples, dims {:?} need {}",
                bytes.len(),
                dims,
                dims.sample_count()
            )));
        }

        let samples: Vec<f64> = bytes.iter().map(|&b| f64::from(b)).collect();
        let data = Array3::from_shape_vec((dims.frames, dims.rows, dims.cols), samples)
            .map_err(|e| AnalysisError::shape(e.to_string()))?;
        Self::new(data, frame_rate)
    }

    /// Number of frames (N).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Returns true if the sequence holds no frames.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Frames per unit time.
    #[inline]
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Shape descriptor (N, H, W).
    pub fn dims(&self) -> SequenceDims {
        let (frames, rows, cols) = self.data.dim();
        SequenceDims { frames, rows, cols }
    }

    /// Shape shared by every frame (H, W).
    pub fn frame_shape(&self) -> (usize, usize) {
        let (_, rows, cols) = self.data.dim();
        (rows, cols)
    }

    /// View of frame `t`.
    ///
    /// # Panics
    /// Panics if `t >= self.len()`.
    pub fn frame(&self, t: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(0), t)
    }

    /// Iterates frames in increasing time order.
    pub fn frames(&self) -> impl ExactSizeIterator<Item = ArrayView2<'_, f64>> + '_ {
        self.data.outer_iter()
    }

    /// View of the whole (N, H, W) buffer.
    pub fn as_array(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    /// The contiguous N*H*W buffer, frame-major then row-major.
    pub fn as_slice(&self) -> Option<&[f64]> {
        self.data.as_slice()
    }
}
