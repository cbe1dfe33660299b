//! Mean rate-of-change reduction.

use super::PARALLEL_PIXEL_THRESHOLD;
use crate::error::AnalysisError;
use crate::sequence::FrameSequence;
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

/// Finite-difference scheme used to estimate per-pixel rates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DifferenceScheme {
    /// (f[t+1] - f[t]) * rate, averaged over N-1 pairs.
    #[default]
    Forward,
    /// (f[t+2] - f[t]) * rate / 2, averaged over N-2 pairs.
    Central,
}

impl DifferenceScheme {
    /// Frame distance between the two samples of one difference.
    fn step(self) -> usize {
        match self {
            Self::Forward => 1,
            Self::Central => 2,
        }
    }

    /// Fewest frames that yield at least one difference.
    pub fn min_frames(self) -> usize {
        self.step() + 1
    }
}

/// Per-pixel mean rate of change, shape (H, W).
#[derive(Debug, Clone, Serialize)]
pub struct DerivativeMatrix {
    rates: Array2<f64>,
}

impl DerivativeMatrix {
    pub fn from_rates(rates: Array2<f64>) -> Self {
        Self { rates }
    }

    #[inline]
    pub fn rates(&self) -> &Array2<f64> {
        &self.rates
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.rates.dim()
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.rates
    }
}

/// Averages scaled frame differences into one rate grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerivativeRateReducer {
    scheme: DifferenceScheme,
}

impl DerivativeRateReducer {
    pub fn new(scheme: DifferenceScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> DifferenceScheme {
        self.scheme
    }

    /// Reduces a sequence to its mean rate-of-change matrix.
    pub fn reduce(&self, sequence: &FrameSequence) -> Result<DerivativeMatrix, AnalysisError> {
        let required = self.scheme.min_frames();
        if sequence.len() < required {
            return Err(AnalysisError::InsufficientFrames {
                required,
                actual: sequence.len(),
            });
        }

        let step = self.scheme.step();
        let pairs = sequence.len() - step;
        let scale = sequence.frame_rate() / step as f64;
        let parallel = sequence.dims().pixel_count() >= PARALLEL_PIXEL_THRESHOLD;

        let mut rates = Array2::<f64>::zeros(sequence.frame_shape());
        for t in 0..pairs {
            let earlier = sequence.frame(t);
            let later = sequence.frame(t + step);
            let zip = Zip::from(&mut rates).and(&later).and(&earlier);
            if parallel {
                zip.par_for_each(|acc, &b, &a| *acc += (b - a) * scale);
            } else {
                zip.for_each(|acc, &b, &a| *acc += (b - a) * scale);
            }
        }
        rates.mapv_inplace(|v| v / pairs as f64);

        tracing::debug!(
            scheme = ?self.scheme,
            pairs,
            parallel,
            "Derivative matrix computed"
        );
        Ok(DerivativeMatrix { rates })
    }
}
