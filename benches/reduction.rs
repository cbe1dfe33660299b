use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use danger_matrix::{
    sequence::{collect_sequence, FrameSource, SourceConfig, SyntheticSource},
    Backend, DerivativeRateReducer, FrameSequence, HistogramBinner, ThresholdCrossingReducer,
};

fn synthetic(width: u32, height: u32, frames: u32) -> FrameSequence {
    let mut source = SyntheticSource::new();
    source
        .open(&SourceConfig {
            width,
            height,
            frame_count: frames,
            front_speed: width as f64 / frames as f64,
            ..SourceConfig::default()
        })
        .expect("valid config");
    collect_sequence(&mut source, frames as usize).expect("synthetic frames")
}

fn bench_crossing(c: &mut Criterion) {
    let mut group = c.benchmark_group("threshold_crossing");
    for &(w, h) in &[(128u32, 96u32), (512, 384)] {
        let seq = synthetic(w, h, 40);
        for backend in [Backend::Portable, Backend::Parallel] {
            let reducer = ThresholdCrossingReducer::with_backend(100.0, backend);
            group.bench_with_input(
                BenchmarkId::new(reducer.kernel_name(), format!("{w}x{h}")),
                &seq,
                |b, seq| b.iter(|| reducer.reduce(black_box(seq)).expect("reduce")),
            );
        }
    }
    group.finish();
}

fn bench_derivative(c: &mut Criterion) {
    let seq = synthetic(512, 384, 40);
    let reducer = DerivativeRateReducer::default();
    c.bench_function("derivative_512x384", |b| {
        b.iter(|| reducer.reduce(black_box(&seq)).expect("reduce"))
    });
}

fn bench_histogram(c: &mut Criterion) {
    let seq = synthetic(512, 384, 40);
    let danger = ThresholdCrossingReducer::new(100.0)
        .reduce(&seq)
        .expect("reduce");
    let binner = HistogramBinner::new(50);
    c.bench_function("histogram_512x384", |b| {
        b.iter(|| binner.bin(black_box(&danger)).expect("bin"))
    });
}

criterion_group!(benches, bench_crossing, bench_derivative, bench_histogram);
criterion_main!(benches);
