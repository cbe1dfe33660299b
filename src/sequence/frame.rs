//! Frame type representing one decoded intensity grid.

use crate::error::AnalysisError;
use ndarray::{Array2, ArrayView2};

/// A single decoded grayscale frame.
///
/// Rows run along the first axis (height), columns along the second (width).
#[derive(Clone)]
pub struct Frame {
    /// Intensity samples, shape (height, width).
    pixels: Array2<f64>,
    /// Position of this frame within its source.
    index: u64,
}

impl Frame {
    /// Creates a new frame from an intensity grid.
    pub fn new(pixels: Array2<f64>, index: u64) -> Self {
        Self { pixels, index }
    }

    /// Creates a frame from a row-major 8-bit grayscale buffer.
    pub fn from_gray8(
        bytes: &[u8],
        width: usize,
        height: usize,
        index: u64,
    ) -> Result<Self, AnalysisError> {
        let samples: Vec<f64> = bytes.iter().map(|&b| f64::from(b)).collect();
        let pixels = Array2::from_shape_vec((height, width), samples).map_err(|e| {
            AnalysisError::shape(format!(
                "{} bytes do not form a {height}x{width} frame: {e}",
                bytes.len()
            ))
        })?;
        Ok(Self { pixels, index })
    }

    /// Returns a view of the intensity grid.
    #[inline]
    pub fn pixels(&self) -> ArrayView2<'_, f64> {
        self.pixels.view()
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    /// Returns (height, width).
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.pixels.dim()
    }

    /// Returns the source index.
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("index", &self.index)
            .finish()
    }
}
