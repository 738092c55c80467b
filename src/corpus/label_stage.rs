//! Label stage: manifest + audio + annotations -> label archives
//!
//! For every manifest entry:
//! 1. Load the audio at the configured sample rate (duration = samples / rate)
//! 2. Label every frame from the annotations
//! 3. Slice the labels into majority-vote windows
//! 4. Write `<output>/<id>.npz` unless no window was produced
//!
//! Finally writes `<output>/index.json` with the archive list, the label
//! distribution and suggested class weights.

use std::fs;
use std::path::Path;

use rayon::prelude::*;

use super::manifest::{load_manifest, ManifestEntry};
use super::stats::CorpusStats;
use super::build_pool;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::io::index::{write_index, LabelIndex};
use crate::io::{load_audio, LabelArchive};
use crate::labels::{create_windows, generate_frame_labels, AnnotationFile, TurnLabel, Window};

/// Label one recording
///
/// # Arguments
///
/// * `audio_path` - Audio file (any container Symphonia can probe)
/// * `annotation_path` - Annotation JSON for the same recording
/// * `config` - Pipeline configuration
///
/// # Returns
///
/// The archive contents with the windows they were packed from, or `None` if
/// the recording is shorter than one window
pub fn process_conversation(
    audio_path: &Path,
    annotation_path: &Path,
    config: &PipelineConfig,
) -> Result<Option<(LabelArchive, Vec<Window>)>, PipelineError> {
    let data = &config.data;
    let annotations = AnnotationFile::load(annotation_path)?;
    let audio = load_audio(audio_path, data.sample_rate)?;
    let duration = audio.len() as f64 / data.sample_rate as f64;

    if annotations.duration > 0.0 && (annotations.duration - duration).abs() > 0.5 {
        log::debug!(
            "{}: annotated duration {:.2}s differs from audio duration {:.2}s",
            annotation_path.display(),
            annotations.duration,
            duration
        );
    }

    let frame_labels = generate_frame_labels(&annotations.annotations, duration, data.frame_shift_ms);
    let windows = create_windows(&frame_labels, config.model.context_frames, data.hop_frames);
    if windows.is_empty() {
        return Ok(None);
    }

    let archive = LabelArchive::new(audio, &frame_labels, &windows, data.sample_rate);
    Ok(Some((archive, windows)))
}

/// Run the label stage over a corpus directory
///
/// # Arguments
///
/// * `input_dir` - Corpus directory containing `manifest.json`
/// * `output_dir` - Destination for archives and `index.json` (created if needed)
/// * `config` - Pipeline configuration
/// * `jobs` - Worker threads (0 = all cores but one)
///
/// # Errors
///
/// Only run-level failures: a missing manifest, an invalid configuration or an
/// unwritable output directory. Per-recording failures are logged and listed in
/// the index.
pub fn run_label_stage(
    input_dir: &Path,
    output_dir: &Path,
    config: &PipelineConfig,
    jobs: usize,
) -> Result<LabelIndex, PipelineError> {
    config.validate()?;
    let manifest = load_manifest(input_dir)?;
    fs::create_dir_all(output_dir)?;

    log::info!("Labelling {} conversations from {}", manifest.len(), input_dir.display());

    let pool = build_pool(jobs)?;
    let stats = pool.install(|| {
        manifest
            .par_iter()
            .fold(CorpusStats::default, |stats, entry| {
                label_entry(stats, entry, input_dir, output_dir, config)
            })
            .reduce(CorpusStats::default, CorpusStats::merge)
    });

    let index = LabelIndex {
        files: stats.files.clone(),
        total_windows: stats.total_windows,
        label_distribution: stats.label_distribution(),
        class_weights: stats.class_weights(),
        absent: stats.absent.clone(),
        failed: stats.failed.clone(),
    };
    write_index(output_dir, &index)?;

    log::info!(
        "Processed {} conversations -> {} training windows ({} absent, {} failed)",
        manifest.len(),
        index.total_windows,
        index.absent.len(),
        index.failed.len()
    );
    for label in TurnLabel::ALL {
        let count = stats.label_counts[label.index()];
        let pct = if index.total_windows > 0 {
            count as f64 / index.total_windows as f64 * 100.0
        } else {
            0.0
        };
        log::info!("  {:20}: {:6} ({:.1}%)", label.name(), count, pct);
    }

    Ok(index)
}

/// Label one manifest entry and fold the outcome into `stats`
fn label_entry(
    stats: CorpusStats,
    entry: &ManifestEntry,
    input_dir: &Path,
    output_dir: &Path,
    config: &PipelineConfig,
) -> CorpusStats {
    let audio_path = entry.audio_in(input_dir);
    let annotation_path = entry.annotations_in(input_dir);

    let (archive, windows) = match process_conversation(&audio_path, &annotation_path, config) {
        Ok(Some(labelled)) => labelled,
        Ok(None) => {
            log::info!("{}: no full window, skipping", entry.id);
            return stats.with_absent(&entry.id);
        }
        Err(e) => {
            log::warn!("{}: labelling failed: {}", entry.id, e);
            return stats.with_failure(&entry.id);
        }
    };

    let out_path = output_dir.join(format!("{}.npz", entry.id));
    if let Err(e) = archive.write(&out_path) {
        log::warn!("{}: could not write {}: {}", entry.id, out_path.display(), e);
        return stats.with_failure(&entry.id);
    }

    stats.with_archive(out_path, windows.iter().map(|w| w.majority_label))
}
