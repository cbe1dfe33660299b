//! Analysis parameters.

use crate::error::AnalysisError;
use crate::reduction::{Backend, DifferenceScheme};
use serde::{Deserialize, Serialize};

/// Which reducer output feeds the trace and histogram summaries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    /// First-crossing times.
    #[default]
    Danger,
    /// Mean rates of change.
    Derivative,
}

/// Parameters of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Intensity a pixel must reach to count as crossed.
    pub threshold: f64,
    /// Saturation level of representative traces; defaults to `threshold`.
    pub clip_threshold: Option<f64>,
    /// Number of histogram edges (bins + 1).
    pub bin_count: usize,
    /// First-crossing kernel.
    pub backend: Backend,
    /// Finite-difference scheme of the derivative matrix.
    pub scheme: DifferenceScheme,
    /// Matrix the summaries are computed from.
    pub reference: ReferenceKind,
    /// Also compute the derivative matrix when it is not the reference.
    pub derivative: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: 100.0,
            clip_threshold: None,
            bin_count: 10,
            backend: Backend::default(),
            scheme: DifferenceScheme::default(),
            reference: ReferenceKind::default(),
            derivative: true,
        }
    }
}

impl AnalysisConfig {
    /// Creates a configuration with the given threshold.
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }

    /// Effective clip threshold for traces.
    pub fn clip(&self) -> f64 {
        self.clip_threshold.unwrap_or(self.threshold)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.threshold.is_finite() {
            return Err(AnalysisError::InvalidParameter {
                name: "threshold",
                reason: format!("must be finite, got {}", self.threshold),
            });
        }
        if !self.clip().is_finite() {
            return Err(AnalysisError::InvalidParameter {
                name: "clip_threshold",
                reason: format!("must be finite, got {}", self.clip()),
            });
        }
        if self.bin_count < 2 {
            return Err(AnalysisError::InvalidParameter {
                name: "bin_count",
                reason: format!("must be at least 2 edges, got {}", self.bin_count),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_clip_defaults_to_threshold() {
        let mut config = AnalysisConfig::with_threshold(42.0);
        assert_eq!(config.clip(), 42.0);

        config.clip_threshold = Some(10.0);
        assert_eq!(config.clip(), 10.0);
    }

    #[test]
    fn test_invalid_parameters() {
        let config = AnalysisConfig::with_threshold(f64::INFINITY);
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidParameter { name: "threshold", .. })
        ));

        for bin_count in [0, 1] {
            let config = AnalysisConfig {
                bin_count,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(AnalysisError::InvalidParameter { name: "bin_count", .. })
            ));
        }
    }
}
