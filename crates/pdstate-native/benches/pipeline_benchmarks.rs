//! Benchmarks for the motion analysis pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pdstate_core::config::{BandPlan, PipelineConfig};
use pdstate_core::math::{EmaFilter, MovingAverage};
use pdstate_core::transport::NullTransport;
use pdstate_core::types::{MotionSample, Vec3};
use pdstate_native::pipeline::MotionPipeline;
use pdstate_native::processing::fft::SpectralAnalyzer;

/// Generate a synthetic fused motion trace (tremor tone with pseudo-noise)
fn generate_fused_samples(n: usize, freq_hz: f32, sample_rate: f32) -> Vec<f32> {
    use std::f32::consts::PI;

    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let signal = (2.0 * PI * freq_hz * t).sin();
            let noise = (i as f32 * 0.123).sin() * 0.1; // Pseudo-noise
            signal + noise
        })
        .collect()
}

fn bench_fft_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("fft_analysis");

    for size in [156, 256, 512].iter() {
        let samples = generate_fused_samples(*size, 4.0, 52.0);
        let fft_size = (*size).next_power_of_two();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            let mut analyzer = SpectralAnalyzer::new(fft_size, 52.0);
            b.iter(|| black_box(analyzer.analyze(black_box(&samples)).unwrap()));
        });
    }

    group.finish();
}

fn bench_band_energy(c: &mut Criterion) {
    let mut group = c.benchmark_group("band_energy");

    let samples = generate_fused_samples(156, 4.0, 52.0);
    let mut analyzer = SpectralAnalyzer::new(256, 52.0);
    let spectrum = analyzer.analyze(&samples).unwrap();
    let bands = BandPlan::STANDARD;

    group.bench_function("four_bands", |b| {
        b.iter(|| {
            let t = spectrum.band_energy(black_box(bands.tremor));
            let d = spectrum.band_energy(black_box(bands.dyskinesia));
            let g = spectrum.band_energy(black_box(bands.gait));
            let total = spectrum.band_energy(black_box(bands.total));
            black_box((t, d, g, total))
        });
    });

    group.finish();
}

fn bench_window_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_classification");

    let window = generate_fused_samples(156, 4.0, 52.0);

    group.bench_function("full_window", |b| {
        let mut pipeline =
            MotionPipeline::new(PipelineConfig::default(), NullTransport).unwrap();
        b.iter(|| black_box(pipeline.process_window(black_box(&window))));
    });

    group.finish();
}

fn bench_smoothing_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("smoothing");

    let samples = generate_fused_samples(156, 4.0, 52.0);

    group.bench_function("ema", |b| {
        b.iter(|| {
            let mut filter = EmaFilter::new(0.1);
            let mut acc = 0.0_f32;
            for &s in &samples {
                acc += filter.filter(black_box(s));
            }
            black_box(acc)
        });
    });

    group.bench_function("moving_average_8", |b| {
        b.iter(|| {
            let mut filter = MovingAverage::<8>::new();
            let mut acc = 0.0_f32;
            for &s in &samples {
                acc += filter.filter(black_box(s));
            }
            black_box(acc)
        });
    });

    group.finish();
}

fn bench_tick_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_path");

    // A full 3-second window of ticks, the steady-state unit of work
    let samples: Vec<MotionSample> = (0..156)
        .map(|i| {
            let t = i as f32 / 52.0;
            let tone = (2.0 * std::f32::consts::PI * 4.0 * t).sin();
            MotionSample {
                accel: Vec3::new(1.0 + tone, 0.0, 0.0),
                gyro: Vec3::new(0.0, tone * 10.0, 0.0),
            }
        })
        .collect();

    group.bench_function("one_window_of_ticks", |b| {
        let mut pipeline =
            MotionPipeline::new(PipelineConfig::default(), NullTransport).unwrap();
        b.iter(|| {
            for &sample in &samples {
                black_box(pipeline.process_sample(black_box(sample)));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_fft_analysis,
    bench_band_energy,
    bench_window_classification,
    bench_smoothing_filters,
    bench_tick_path
);
criterion_main!(benches);
