//! Failure taxonomy shared by the reducers and summaries.
//!
//! Every operation validates its preconditions up front and returns the
//! first violation it finds. Nothing here is retried: the computations are
//! deterministic, so a retry would reproduce the same failure.

use thiserror::Error;

/// Errors raised by the reduction and summary operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Zero frames were supplied where at least one is required.
    #[error("frame sequence is empty")]
    EmptyInput,

    /// Frames or a reference matrix are not 2-D, are empty, or disagree in shape.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// A pairwise difference needs more frames than were supplied.
    #[error("need at least {required} frames, got {actual}")]
    InsufficientFrames { required: usize, actual: usize },

    /// The data cannot be binned (zero range, no samples, or no bins).
    #[error("degenerate histogram: {0}")]
    DegenerateHistogram(String),

    /// No pixel ever left the sentinel value.
    #[error("no pixel crossed the threshold; result is uniformly unset")]
    AllZeroResult,

    /// An intensity sample is NaN, infinite or negative.
    #[error("invalid sample {value} at frame {frame}, pixel ({row}, {col})")]
    InvalidSample {
        frame: usize,
        row: usize,
        col: usize,
        value: f64,
    },

    /// Frame rate must be positive and finite.
    #[error("invalid frame rate {0}")]
    InvalidFrameRate(f64),

    /// A scalar parameter is out of its domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The run was cancelled between frames.
    #[error("analysis cancelled after {frames_done} frames")]
    Cancelled { frames_done: usize },
}

impl AnalysisError {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }
}
