//! Analysis results handed to reporting collaborators.

use super::ReferenceKind;
use crate::reduction::{DangerMatrix, DerivativeMatrix};
use crate::sequence::SequenceDims;
use crate::summary::{HistogramOutput, RowProfile, TracePair};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything one analysis run produced.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Shape of the analyzed sequence.
    pub dims: SequenceDims,
    /// Frame rate of the analyzed sequence.
    pub frame_rate: f64,
    /// First-crossing kernel that produced `danger`.
    pub kernel: &'static str,
    /// Matrix the summaries were computed from.
    pub reference: ReferenceKind,
    /// First-crossing times.
    pub danger: DangerMatrix,
    /// Mean rates of change, if computed.
    pub derivative: Option<DerivativeMatrix>,
    /// Typical and extreme pixel traces.
    pub traces: TracePair,
    /// Distribution of reference values.
    pub histogram: HistogramOutput,
    /// Per-row mean of the reference matrix.
    pub row_profile: RowProfile,
    /// Fraction of pixels that crossed the threshold.
    pub crossed_fraction: f64,
    /// Wall time of the run in milliseconds.
    pub elapsed_ms: f64,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// Earliest and latest crossing time, ignoring unset pixels.
    pub fn crossing_range(&self) -> Option<(f64, f64)> {
        self.danger
            .times()
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }
}
