//! Row-wise profile of a reference matrix.

use super::{linspace, ReferenceGrid};
use crate::error::AnalysisError;
use ndarray::Axis;
use serde::Serialize;

/// Mean reference value of each row, paired with a row position.
#[derive(Debug, Clone, Serialize)]
pub struct RowProfile {
    positions: Vec<f64>,
    means: Vec<f64>,
}

impl RowProfile {
    /// Averages each row over its finite cells.
    ///
    /// Positions are spaced evenly over [0, H]. A row without any finite
    /// cell reports NaN.
    pub fn from_reference<R>(reference: &R) -> Result<Self, AnalysisError>
    where
        R: ReferenceGrid + ?Sized,
    {
        let grid = reference.grid();
        if grid.is_empty() {
            return Err(AnalysisError::shape("reference matrix is empty"));
        }

        let means = grid
            .axis_iter(Axis(0))
            .map(|row| {
                let (sum, n) = row
                    .iter()
                    .filter(|v| v.is_finite())
                    .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
                if n == 0 {
                    f64::NAN
                } else {
                    sum / n as f64
                }
            })
            .collect::<Vec<_>>();
        let positions = linspace(0.0, means.len() as f64, means.len());

        Ok(Self { positions, means })
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_row_means_skip_sentinels() {
        let reference = array![[1.0, 3.0], [f64::NAN, 4.0], [f64::NAN, f64::NAN]];
        let profile = RowProfile::from_reference(&reference).unwrap();

        assert_eq!(profile.positions(), &[0.0, 1.5, 3.0]);
        assert_eq!(profile.means()[0], 2.0);
        assert_eq!(profile.means()[1], 4.0);
        assert!(profile.means()[2].is_nan());
    }

    #[test]
    fn test_empty_reference_rejected() {
        let reference = Array2::<f64>::zeros((0, 0));
        assert!(RowProfile::from_reference(&reference).is_err());
    }
}
