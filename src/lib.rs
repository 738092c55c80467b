//! # turnprep
//!
//! Training-data preparation for turn-taking classifiers: turns conversational
//! audio plus time-stamped event annotations into fixed-length windows of
//! 17-dimensional acoustic features with one label per window.
//!
//! ## Features
//!
//! - **Frame labelling**: annotations to per-frame labels with interrupt dominance
//! - **Windowing**: fixed-context windows with deterministic majority vote
//! - **Feature extraction**: 13 cepstral coefficients, RMS energy, YIN pitch,
//!   speech rate and accumulated pause per 10 ms frame
//! - **Corpus stages**: parallel label and feature passes writing NumPy archives
//!
//! ## Quick Start
//!
//! ```no_run
//! use turnprep::{prepare_recording, Annotation, PipelineConfig, TurnLabel};
//!
//! // Mono samples at the configured rate (16 kHz by default)
//! let samples: Vec<f32> = vec![0.0; 16000 * 10];
//! let annotations = vec![
//!     Annotation::new(0.0, 4.0, TurnLabel::Speaking, "A"),
//!     Annotation::new(4.0, 4.5, TurnLabel::TurnComplete, "A"),
//! ];
//!
//! let examples = prepare_recording(&samples, &annotations, &PipelineConfig::default())?;
//! println!("{} windows of shape {:?}", examples.len(), &examples.features.shape()[1..]);
//! # Ok::<(), turnprep::PipelineError>(())
//! ```
//!
//! ## Architecture
//!
//! Each recording flows through four stages:
//!
//! ```text
//! Annotations → Frame Labeler → Windower ─┐
//!                                          ├→ Window Assembler → (N, C, 17) + (N,)
//! Audio ──────→ Feature Extractor ────────┘
//! ```
//!
//! Across a corpus, [`corpus::run_label_stage`] and [`corpus::run_feature_stage`]
//! run this per recording in parallel and write per-recording `.npz` archives
//! plus an `index.json`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod corpus;
pub mod error;
pub mod features;
pub mod io;
pub mod labels;
pub mod preprocessing;

// Re-export main types
pub use config::{DataConfig, ModelConfig, PipelineConfig};
pub use error::PipelineError;
pub use features::{assemble_windows, FeatureExtractor, TrainingExamples, FEATURE_DIM};
pub use labels::{create_windows, generate_frame_labels, Annotation, AnnotationFile, TurnLabel, Window};

use ndarray::{Array1, Array3};

/// Prepare training examples for one in-memory recording
///
/// Runs labelling, windowing, feature extraction and window assembly. Never
/// applies noise augmentation, so the result is deterministic and suitable for
/// evaluation.
///
/// # Arguments
///
/// * `samples` - Mono audio at `config.data.sample_rate`, normalized to [-1.0, 1.0]
/// * `annotations` - Event annotations for the recording
/// * `config` - Pipeline configuration
///
/// # Returns
///
/// `TrainingExamples` with `features` of shape `(windows, context_frames, 17)`;
/// a recording shorter than one window yields zero windows
///
/// # Errors
///
/// Returns `PipelineError` if the configuration is invalid or extraction fails
pub fn prepare_recording(
    samples: &[f32],
    annotations: &[Annotation],
    config: &PipelineConfig,
) -> Result<TrainingExamples, PipelineError> {
    config.validate()?;
    let data = &config.data;
    let duration = samples.len() as f64 / data.sample_rate as f64;

    log::debug!(
        "Preparing recording: {} samples at {} Hz ({:.2}s), {} annotations",
        samples.len(),
        data.sample_rate,
        duration,
        annotations.len()
    );

    let frame_labels = generate_frame_labels(annotations, duration, data.frame_shift_ms);
    let windows = create_windows(&frame_labels, config.model.context_frames, data.hop_frames);
    if windows.is_empty() {
        return Ok(TrainingExamples {
            features: Array3::zeros((0, 0, FEATURE_DIM)),
            labels: Array1::zeros(0),
        });
    }

    let extractor = FeatureExtractor::new(config)?;
    let features = extractor.extract(samples)?;
    TrainingExamples::from_windows(features.view(), &windows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_recording_yields_no_windows() {
        let samples = vec![0.0f32; 8000];
        let annotations = vec![Annotation::new(0.0, 0.5, TurnLabel::Speaking, "A")];
        let examples = prepare_recording(&samples, &annotations, &PipelineConfig::default()).unwrap();
        assert!(examples.is_empty());
        assert_eq!(examples.features.shape(), &[0, 0, FEATURE_DIM]);
    }

    #[test]
    fn test_window_labels_follow_annotations() {
        // 2 s at 16 kHz: 200 labelled frames, windows of 100 every 10
        let samples: Vec<f32> = (0..32000).map(|i| 0.1 * (i as f32 * 0.05).sin()).collect();
        let annotations = vec![
            Annotation::new(0.0, 1.2, TurnLabel::Speaking, "A"),
            Annotation::new(1.5, 1.6, TurnLabel::InterruptIntent, "B"),
        ];
        let examples = prepare_recording(&samples, &annotations, &PipelineConfig::default()).unwrap();
        assert_eq!(examples.len(), 11);
        assert_eq!(examples.features.shape(), &[11, 100, FEATURE_DIM]);
        assert_eq!(examples.labels[0], TurnLabel::Speaking.index() as i64);
        assert_eq!(examples.labels[10], TurnLabel::ThinkingPause.index() as i64);
    }
}
