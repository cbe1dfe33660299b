//! Statistical summaries of a reference matrix.
//!
//! A reference matrix is any (H, W) map produced by a reducer. Summaries
//! pick representative pixels and trace them through the sequence, bin the
//! map's values, and profile it row by row.

mod histogram;
mod profile;
mod sampler;

pub use histogram::{linspace, Histogram, HistogramBinner, HistogramOutput};
pub use profile::RowProfile;
pub use sampler::{DistributionSampler, PixelLocation, RepresentativeTrace, TracePair};

use crate::reduction::{DangerMatrix, DerivativeMatrix};
use ndarray::{Array2, ArrayView2};

/// A 2-D grid a summary can be computed from.
pub trait ReferenceGrid {
    /// View of the grid, shape (H, W).
    fn grid(&self) -> ArrayView2<'_, f64>;
}

impl ReferenceGrid for DangerMatrix {
    fn grid(&self) -> ArrayView2<'_, f64> {
        self.times().view()
    }
}

impl ReferenceGrid for DerivativeMatrix {
    fn grid(&self) -> ArrayView2<'_, f64> {
        self.rates().view()
    }
}

impl ReferenceGrid for Array2<f64> {
    fn grid(&self) -> ArrayView2<'_, f64> {
        self.view()
    }
}
