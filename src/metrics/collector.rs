//! Metrics collection and registry.

use crate::analysis::AnalysisReport;
use crate::error::AnalysisError;
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus metrics registry for analysis runs.
pub struct MetricsRegistry {
    registry: Registry,

    // Run outcomes
    runs_total: IntCounter,
    failures_total: IntCounterVec,

    // Throughput
    frames_processed_total: IntCounter,
    pixels_processed_total: IntCounter,

    // Latest run
    crossed_fraction: Gauge,
    last_run_ms: Gauge,
}

impl MetricsRegistry {
    /// Creates a new registry with all analysis metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let runs_total = IntCounter::new(
            "danger_matrix_runs_total",
            "Total number of successful analysis runs",
        )?;
        let failures_total = IntCounterVec::new(
            Opts::new(
                "danger_matrix_failures_total",
                "Total number of failed analysis runs by reason",
            ),
            &["reason"],
        )?;
        let frames_processed_total = IntCounter::new(
            "danger_matrix_frames_processed_total",
            "Total frames reduced across all successful runs",
        )?;
        let pixels_processed_total = IntCounter::new(
            "danger_matrix_pixels_processed_total",
            "Total frame samples (frames x pixels) reduced",
        )?;
        let crossed_fraction = Gauge::new(
            "danger_matrix_crossed_fraction",
            "Fraction of pixels that crossed the threshold in the latest run",
        )?;
        let last_run_ms = Gauge::new(
            "danger_matrix_last_run_milliseconds",
            "Wall time of the latest successful run",
        )?;

        registry.register(Box::new(runs_total.clone()))?;
        registry.register(Box::new(failures_total.clone()))?;
        registry.register(Box::new(frames_processed_total.clone()))?;
        registry.register(Box::new(pixels_processed_total.clone()))?;
        registry.register(Box::new(crossed_fraction.clone()))?;
        registry.register(Box::new(last_run_ms.clone()))?;

        Ok(Self {
            registry,
            runs_total,
            failures_total,
            frames_processed_total,
            pixels_processed_total,
            crossed_fraction,
            last_run_ms,
        })
    }

    /// Records a successful run.
    pub fn observe_report(&self, report: &AnalysisReport) {
        self.runs_total.inc();
        self.frames_processed_total.inc_by(report.dims.frames as u64);
        self.pixels_processed_total
            .inc_by(report.dims.sample_count() as u64);
        self.crossed_fraction.set(report.crossed_fraction);
        self.last_run_ms.set(report.elapsed_ms);
    }

    /// Records a failed run under a label naming the failure.
    pub fn observe_failure(&self, error: &AnalysisError) {
        self.failures_total
            .with_label_values(&[failure_reason(error)])
            .inc();
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn failure_reason(error: &AnalysisError) -> &'static str {
    match error {
        AnalysisError::EmptyInput => "empty_input",
        AnalysisError::InvalidShape(_) => "invalid_shape",
        AnalysisError::InsufficientFrames { .. } => "insufficient_frames",
        AnalysisError::DegenerateHistogram(_) => "degenerate_histogram",
        AnalysisError::AllZeroResult => "all_zero_result",
        AnalysisError::InvalidSample { .. } => "invalid_sample",
        AnalysisError::InvalidFrameRate(_) => "invalid_frame_rate",
        AnalysisError::InvalidParameter { .. } => "invalid_parameter",
        AnalysisError::Cancelled { .. } => "cancelled",
    }
}
