//! Analysis runs over a whole frame sequence.
//!
//! An [`Analyzer`] is built once from an [`AnalysisConfig`]; the crossing
//! kernel is fixed at that point. Each run produces a self-contained
//! [`AnalysisReport`] and leaves the input sequence untouched.

mod analyzer;
mod config;
mod report;

pub use analyzer::Analyzer;
pub use config::{AnalysisConfig, ReferenceKind};
pub use report::AnalysisReport;
