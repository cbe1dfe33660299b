//! Frame-sequence reducers.
//!
//! Reducers collapse an (N, H, W) frame sequence into one (H, W) map:
//! first-crossing times (the danger matrix) or mean rates of change.
//! Each is a pure function of its inputs.

mod crossing;
mod derivative;
mod kernel;

pub use crossing::{check_crossings, CrossingAccumulator, DangerMatrix, ThresholdCrossingReducer};
pub use derivative::{DerivativeMatrix, DerivativeRateReducer, DifferenceScheme};
pub use kernel::{Backend, CrossingKernel, ParallelKernel, PortableKernel};

/// Sentinel for pixels that never reached the threshold.
pub const NOT_CROSSED: f64 = f64::NAN;

/// Grids at least this large are processed on the rayon pool.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 256 * 256;
