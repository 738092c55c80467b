//! Performance benchmarks for feature extraction

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use turnprep::labels::{create_windows, generate_frame_labels};
use turnprep::{assemble_windows, Annotation, FeatureExtractor, PipelineConfig, TurnLabel};

/// 30 seconds of alternating voiced bursts and silence at 16 kHz
fn synthetic_speech() -> Vec<f32> {
    (0..16000 * 30)
        .map(|i| {
            let t = i as f32 / 16000.0;
            let gate = if (t * 2.0).fract() < 0.6 { 1.0 } else { 0.0 };
            gate * (t * 150.0 * 2.0 * std::f32::consts::PI).sin() * 0.4
        })
        .collect()
}

fn bench_extract_all(c: &mut Criterion) {
    let samples = synthetic_speech();
    let extractor = FeatureExtractor::new(&PipelineConfig::default()).unwrap();

    c.bench_function("extract_all_30s", |b| {
        b.iter(|| {
            let _ = extractor.extract_all(black_box(&samples), false);
        });
    });
}

fn bench_label_and_assemble(c: &mut Criterion) {
    let config = PipelineConfig::default();
    let samples = synthetic_speech();
    let features = FeatureExtractor::new(&config).unwrap().extract(&samples).unwrap();
    let annotations: Vec<Annotation> = (0..30)
        .map(|s| {
            let start = s as f64;
            Annotation::new(start, start + 0.6, TurnLabel::Speaking, "A")
        })
        .collect();

    c.bench_function("label_window_assemble_30s", |b| {
        b.iter(|| {
            let labels = generate_frame_labels(black_box(&annotations), 30.0, 10);
            let windows = create_windows(&labels, config.model.context_frames, config.data.hop_frames);
            let _ = assemble_windows(features.view(), &windows);
        });
    });
}

criterion_group!(benches, bench_extract_all, bench_label_and_assemble);
criterion_main!(benches);
