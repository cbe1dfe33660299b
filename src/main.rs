//! Danger Matrix CLI
//!
//! Runs the full analysis over a synthetic fluorescence sequence and prints
//! the resulting summaries.

use clap::Parser;
use danger_matrix::{
    analysis::{Analyzer, ReferenceKind},
    metrics::MetricsRegistry,
    reduction::Backend,
    sequence::{collect_sequence, FileConfig, FrameSource, SyntheticSource},
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "danger-matrix", version, about)]
struct Cli {
    /// TOML configuration file with [source] and [analysis] sections.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to generate.
    #[arg(short, long)]
    frames: Option<u32>,

    /// Crossing threshold intensity.
    #[arg(short, long)]
    threshold: Option<f64>,

    /// First-crossing kernel.
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    /// Matrix the summaries are computed from.
    #[arg(short, long, value_enum)]
    reference: Option<ReferenceKind>,

    /// Print Prometheus metrics after the run.
    #[arg(long)]
    metrics: bool,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    info!("Danger Matrix v{}", danger_matrix::VERSION);

    let mut config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    if let Some(frames) = cli.frames {
        config.source.frame_count = frames;
    }
    if let Some(threshold) = cli.threshold {
        config.analysis.threshold = threshold;
    }
    if let Some(backend) = cli.backend {
        config.analysis.backend = backend;
    }
    if let Some(reference) = cli.reference {
        config.analysis.reference = reference;
    }

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        if let Err(e) = ctrlc::set_handler(move || cancel.store(true, Ordering::Relaxed)) {
            warn!("Could not install Ctrl-C handler: {}", e);
        }
    }

    let mut source = SyntheticSource::new();
    if let Err(e) = source.open(&config.source) {
        eprintln!("Failed to open frame source: {}", e);
        std::process::exit(1);
    }
    let sequence = match collect_sequence(&mut source, config.source.frame_count as usize) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to collect frames: {}", e);
            std::process::exit(1);
        }
    };
    source.close();

    let analyzer = match Analyzer::new(config.analysis.clone()) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Invalid analysis settings: {}", e);
            std::process::exit(1);
        }
    };

    let registry = match MetricsRegistry::new() {
        Ok(r) => Some(r),
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            None
        }
    };

    info!("Analyzing {} frames...", sequence.len());
    let outcome = analyzer.run_cancellable(&sequence, &cancel);

    match &outcome {
        Ok(report) => {
            if let Some(registry) = &registry {
                registry.observe_report(report);
            }

            let dims = report.dims;
            println!(
                "Sequence: {} frames of {}x{} at {} fps",
                dims.frames, dims.rows, dims.cols, report.frame_rate
            );
            println!(
                "Crossed pixels: {:.1}%",
                report.crossed_fraction * 100.0
            );
            if let Some((first, last)) = report.crossing_range() {
                println!("Crossing times: {:.3} .. {:.3}", first, last);
            }

            let hist = &report.histogram.histogram;
            println!("Histogram edges: {:.3?}", hist.edges());
            println!("Histogram counts: {:?}", hist.counts());

            let typical = &report.traces.typical;
            let extreme = &report.traces.extreme;
            println!(
                "Typical set: {} pixels at {:.3}, final {:.1}",
                typical.pixels().len(),
                typical.reference_value(),
                typical.values().last().copied().unwrap_or(f64::NAN)
            );
            println!(
                "Extreme set: {} pixels at {:.3}, final {:.1}",
                extreme.pixels().len(),
                extreme.reference_value(),
                extreme.values().last().copied().unwrap_or(f64::NAN)
            );
        }
        Err(e) => {
            if let Some(registry) = &registry {
                registry.observe_failure(e);
            }
            warn!("Analysis failed: {}", e);
        }
    }

    if cli.metrics {
        if let Some(registry) = &registry {
            match registry.encode() {
                Ok(text) => print!("{}", text),
                Err(e) => warn!("Failed to encode metrics: {}", e),
            }
        }
    }

    if outcome.is_err() {
        std::process::exit(1);
    }
    info!("Done");
}
