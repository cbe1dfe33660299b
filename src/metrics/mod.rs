//! Prometheus metrics for analysis runs.
//!
//! # Metrics Exposed
//!
//! - `danger_matrix_runs_total` - Successful analysis runs
//! - `danger_matrix_failures_total{reason}` - Failed runs by failure kind
//! - `danger_matrix_frames_processed_total` - Frames reduced
//! - `danger_matrix_pixels_processed_total` - Frame samples reduced
//! - `danger_matrix_crossed_fraction` - Crossed-pixel fraction of the latest run
//! - `danger_matrix_last_run_milliseconds` - Wall time of the latest run
//!
//! # Example
//!
//! ```no_run
//! use danger_matrix::metrics::MetricsRegistry;
//! use danger_matrix::AnalysisError;
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! registry.observe_failure(&AnalysisError::AllZeroResult);
//! println!("{}", registry.encode().unwrap());
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry};
