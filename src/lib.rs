//! Danger Matrix Analysis Library
//!
//! Characterizes, per pixel, how quickly intensity in a fluorescence video
//! rises to a detection threshold. A frame sequence is reduced to spatial
//! maps, and those maps are summarized statistically.
//!
//! # Architecture
//!
//! ```text
//! sequence → reduction (danger matrix, derivative matrix)
//!                ↓
//!            summary (representative traces, histogram, row profile)
//!                ↓
//!            analysis report → external reporting / visualization
//! ```
//!
//! # Design Principles
//!
//! - **Pure reducers**: every reducer is a function of its inputs; nothing
//!   reads global state and nothing mutates the input sequence
//! - **Distinct sentinel**: pixels that never cross hold NaN, never a time
//! - **Kernel chosen once**: the first-crossing kernel is selected from
//!   configuration when a reducer is built
//! - **Structured failures**: every precondition violation is an
//!   [`AnalysisError`] variant; callers decide how to react
//!
//! # Example
//!
//! ```no_run
//! use danger_matrix::{
//!     analysis::{AnalysisConfig, Analyzer},
//!     sequence::{collect_sequence, FrameSource, SourceConfig, SyntheticSource},
//! };
//!
//! let mut source = SyntheticSource::new();
//! source.open(&SourceConfig::default()).unwrap();
//! let sequence = collect_sequence(&mut source, 60).unwrap();
//!
//! let analyzer = Analyzer::new(AnalysisConfig::with_threshold(100.0)).unwrap();
//! let report = analyzer.run(&sequence).unwrap();
//!
//! println!("crossed: {:.1}%", report.crossed_fraction * 100.0);
//! println!("histogram: {:?}", report.histogram.histogram.counts());
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod error;
pub mod metrics;
pub mod reduction;
pub mod sequence;
pub mod summary;

// Re-export commonly used types at crate root
pub use analysis::{AnalysisConfig, AnalysisReport, Analyzer, ReferenceKind};
pub use error::AnalysisError;
pub use reduction::{
    check_crossings, Backend, CrossingKernel, DangerMatrix, DerivativeMatrix,
    DerivativeRateReducer, DifferenceScheme, ThresholdCrossingReducer, NOT_CROSSED,
};
pub use sequence::{Frame, FrameSequence, SequenceDims};
pub use summary::{
    DistributionSampler, Histogram, HistogramBinner, HistogramOutput, RepresentativeTrace,
    RowProfile, TracePair,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
