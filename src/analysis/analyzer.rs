//! End-to-end analysis of one frame sequence.
//!
//! ```text
//! sequence → crossing reducer ─┐
//!          → derivative reducer┴→ reference → sampler, binner, row profile
//! ```

use super::{AnalysisConfig, AnalysisReport, ReferenceKind};
use crate::error::AnalysisError;
use crate::reduction::{
    check_crossings, Backend, CrossingAccumulator, DangerMatrix, DerivativeMatrix,
    DerivativeRateReducer, ThresholdCrossingReducer,
};
use crate::sequence::FrameSequence;
use crate::summary::{DistributionSampler, HistogramBinner, ReferenceGrid, RowProfile};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Runs the reducers and summaries with one fixed configuration.
pub struct Analyzer {
    config: AnalysisConfig,
    crossing: ThresholdCrossingReducer,
    derivative: DerivativeRateReducer,
    sampler: DistributionSampler,
    binner: HistogramBinner,
}

impl Analyzer {
    /// Validates `config` and selects the crossing kernel.
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            crossing: ThresholdCrossingReducer::with_backend(config.threshold, config.backend),
            derivative: DerivativeRateReducer::new(config.scheme),
            sampler: DistributionSampler::new(config.clip()),
            binner: HistogramBinner::new(config.bin_count),
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyzes `sequence` in one pass.
    pub fn run(&self, sequence: &FrameSequence) -> Result<AnalysisReport, AnalysisError> {
        self.run_inner(sequence, None)
    }

    /// Analyzes `sequence`, checking `cancel` between frames of the
    /// first-crossing reduction.
    pub fn run_cancellable(
        &self,
        sequence: &FrameSequence,
        cancel: &AtomicBool,
    ) -> Result<AnalysisReport, AnalysisError> {
        self.run_inner(sequence, Some(cancel))
    }

    fn run_inner(
        &self,
        sequence: &FrameSequence,
        cancel: Option<&AtomicBool>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let started = Instant::now();
        let dims = sequence.dims();

        // The portable kernel can be driven frame by frame; others run whole.
        let danger = match cancel {
            Some(flag) if self.config.backend == Backend::Portable => {
                self.reduce_stepwise(sequence, flag)?
            }
            Some(flag) => {
                check_cancel(flag, 0)?;
                self.crossing.reduce(sequence)?
            }
            None => self.crossing.reduce(sequence)?,
        };
        let kernel = self.crossing.kernel_name();

        // Only the danger reference is meaningless when nothing crossed.
        if let Err(e) = check_crossings(&danger) {
            tracing::warn!(
                threshold = self.config.threshold,
                frames = dims.frames,
                reference = ?self.config.reference,
                "No pixel reached the threshold"
            );
            if self.config.reference == ReferenceKind::Danger {
                return Err(e);
            }
        }

        if let Some(flag) = cancel {
            check_cancel(flag, dims.frames)?;
        }
        let derivative = self.derivative_for(sequence)?;
        let reference: &dyn ReferenceGrid = match (self.config.reference, derivative.as_ref()) {
            (ReferenceKind::Danger, _) => &danger,
            (ReferenceKind::Derivative, Some(rates)) => rates,
            (ReferenceKind::Derivative, None) => {
                return Err(AnalysisError::InsufficientFrames {
                    required: self.derivative.scheme().min_frames(),
                    actual: dims.frames,
                })
            }
        };

        let traces = self.sampler.sample(sequence, reference)?;
        let histogram = self.binner.bin(reference)?;
        let row_profile = RowProfile::from_reference(reference)?;

        let crossed_fraction = danger.crossed_fraction();
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            frames = dims.frames,
            rows = dims.rows,
            cols = dims.cols,
            kernel,
            reference = ?self.config.reference,
            crossed_fraction,
            elapsed_ms,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            dims,
            frame_rate: sequence.frame_rate(),
            kernel,
            reference: self.config.reference,
            danger,
            derivative,
            traces,
            histogram,
            row_profile,
            crossed_fraction,
            elapsed_ms,
            generated_at: Utc::now(),
        })
    }

    fn reduce_stepwise(
        &self,
        sequence: &FrameSequence,
        cancel: &AtomicBool,
    ) -> Result<DangerMatrix, AnalysisError> {
        if sequence.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let mut acc = CrossingAccumulator::new(
            sequence.frame_shape(),
            self.config.threshold,
            sequence.frame_rate(),
        )?;
        for (t, frame) in sequence.frames().enumerate() {
            check_cancel(cancel, t)?;
            let crossed = acc.push(frame)?;
            tracing::trace!(frame = t, crossed, "Frame folded");
        }
        acc.finish()
    }

    fn derivative_for(
        &self,
        sequence: &FrameSequence,
    ) -> Result<Option<DerivativeMatrix>, AnalysisError> {
        if self.config.reference == ReferenceKind::Derivative {
            return self.derivative.reduce(sequence).map(Some);
        }
        if !self.config.derivative {
            return Ok(None);
        }
        if sequence.len() < self.derivative.scheme().min_frames() {
            tracing::debug!(
                frames = sequence.len(),
                "Too few frames for a derivative matrix; skipping"
            );
            return Ok(None);
        }
        self.derivative.reduce(sequence).map(Some)
    }
}

fn check_cancel(flag: &AtomicBool, frames_done: usize) -> Result<(), AnalysisError> {
    if flag.load(Ordering::Relaxed) {
        tracing::info!(frames_done, "Analysis cancelled");
        return Err(AnalysisError::Cancelled { frames_done });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{collect_sequence, FrameSource, SourceConfig, SyntheticSource};
    use ndarray::Array3;

    fn synthetic(frames: u32) -> FrameSequence {
        let mut source = SyntheticSource::new();
        source
            .open(&SourceConfig {
                width: 12,
                height: 10,
                frame_count: frames,
                ..SourceConfig::default()
            })
            .unwrap();
        collect_sequence(&mut source, frames as usize).unwrap()
    }

    #[test]
    fn test_full_run_on_synthetic_front() {
        let analyzer = Analyzer::new(AnalysisConfig::with_threshold(100.0)).unwrap();
        let seq = synthetic(30);
        let report = analyzer.run(&seq).unwrap();

        assert_eq!(report.danger.shape(), (10, 12));
        assert!(report.derivative.is_some());
        assert_eq!(report.traces.typical.len(), 30);
        assert!(report.crossed_fraction > 0.0);
        assert_eq!(report.histogram.histogram.bin_count(), 9);
        assert_eq!(report.row_profile.means().len(), 10);

        let (first, last) = report.crossing_range().unwrap();
        assert!(first <= last);
        assert!(last <= 29.0 / seq.frame_rate());
    }

    #[test]
    fn test_backends_agree() {
        let seq = synthetic(20);
        let portable = Analyzer::new(AnalysisConfig::with_threshold(80.0)).unwrap();
        let parallel = Analyzer::new(AnalysisConfig {
            backend: Backend::Parallel,
            ..AnalysisConfig::with_threshold(80.0)
        })
        .unwrap();

        let a = portable.run(&seq).unwrap();
        let b = parallel.run(&seq).unwrap();
        assert_eq!(a.kernel, "portable");
        assert_eq!(b.kernel, "parallel");
        assert_eq!(a.histogram.histogram, b.histogram.histogram);
    }

    #[test]
    fn test_stepwise_matches_single_pass() {
        let seq = synthetic(15);
        let analyzer = Analyzer::new(AnalysisConfig::with_threshold(60.0)).unwrap();
        let flag = AtomicBool::new(false);

        let whole = analyzer.run(&seq).unwrap();
        let stepwise = analyzer.run_cancellable(&seq, &flag).unwrap();
        assert_eq!(whole.histogram.histogram, stepwise.histogram.histogram);
        assert_eq!(whole.crossed_fraction, stepwise.crossed_fraction);
        assert_eq!(stepwise.kernel, "portable");
    }

    #[test]
    fn test_parallel_backend_honors_cancel() {
        let seq = synthetic(5);
        let analyzer = Analyzer::new(AnalysisConfig {
            backend: Backend::Parallel,
            ..AnalysisConfig::default()
        })
        .unwrap();
        let flag = AtomicBool::new(true);

        assert!(matches!(
            analyzer.run_cancellable(&seq, &flag),
            Err(AnalysisError::Cancelled { frames_done: 0 })
        ));
    }

    #[test]
    fn test_cancelled_run() {
        let seq = synthetic(5);
        let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
        let flag = AtomicBool::new(true);

        assert_eq!(
            analyzer.run_cancellable(&seq, &flag).unwrap_err(),
            AnalysisError::Cancelled { frames_done: 0 }
        );
    }

    #[test]
    fn test_no_crossing_fails_closed() {
        let seq = FrameSequence::new(Array3::from_elem((4, 3, 3), 1.0), 10.0).unwrap();
        let analyzer = Analyzer::new(AnalysisConfig::with_threshold(50.0)).unwrap();
        assert_eq!(
            analyzer.run(&seq).unwrap_err(),
            AnalysisError::AllZeroResult
        );
    }

    #[test]
    fn test_no_crossing_still_summarizes_derivative() {
        let seq = FrameSequence::new(
            Array3::from_shape_fn((4, 2, 2), |(t, _, _)| t as f64),
            10.0,
        )
        .unwrap();
        let analyzer = Analyzer::new(AnalysisConfig {
            reference: ReferenceKind::Derivative,
            ..AnalysisConfig::with_threshold(100.0)
        })
        .unwrap();

        let report = analyzer.run(&seq).unwrap();
        assert!(report.danger.is_uniformly_unset());
        assert_eq!(report.crossed_fraction, 0.0);
        assert_eq!(report.crossing_range(), None);
        assert_eq!(report.traces.typical.reference_value(), 10.0);
        assert_eq!(report.histogram.histogram.total(), 4);
    }

    #[test]
    fn test_derivative_reference() {
        let seq = synthetic(12);
        let analyzer = Analyzer::new(AnalysisConfig {
            reference: ReferenceKind::Derivative,
            ..AnalysisConfig::with_threshold(50.0)
        })
        .unwrap();

        let report = analyzer.run(&seq).unwrap();
        assert_eq!(report.reference, ReferenceKind::Derivative);
        let rates = report.derivative.as_ref().unwrap();
        let max_rate = rates.rates().iter().copied().fold(f64::MIN, f64::max);
        assert_eq!(report.traces.extreme.reference_value(), max_rate);
    }

    #[test]
    fn test_single_frame_skips_optional_derivative() {
        let seq = FrameSequence::new(Array3::from_elem((1, 2, 2), 200.0), 25.0).unwrap();
        let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();

        // Every pixel crosses at t = 0, so the histogram range collapses.
        assert!(matches!(
            analyzer.run(&seq),
            Err(AnalysisError::DegenerateHistogram(_))
        ));

        let derivative_ref = Analyzer::new(AnalysisConfig {
            reference: ReferenceKind::Derivative,
            ..AnalysisConfig::default()
        })
        .unwrap();
        assert!(matches!(
            derivative_ref.run(&seq),
            Err(AnalysisError::InsufficientFrames { .. })
        ));
    }
}
