//! Feature stage: label archives -> windowed feature archives
//!
//! Reads the label stage's `index.json`, extracts the 17-dimensional feature
//! matrix of every listed recording, gathers each window's frames and writes
//! `<output>/<id>.npz` with `features (N, C, 17)` and `labels (N,)`.

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::{concatenate, Array1, Array3, ArrayView1, ArrayView3, Axis};
use rayon::prelude::*;

use super::build_pool;
use super::stats::CorpusStats;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::features::{FeatureExtractor, TrainingExamples, FEATURE_DIM};
use crate::io::archive::{read_feature_archive, write_feature_archive, LabelArchive};
use crate::io::index::{read_index, resolve_listed, write_index, FeatureIndex, LabelIndex};
use crate::labels::Window;

/// Run the feature stage over a label-stage directory
///
/// # Arguments
///
/// * `input_dir` - Label stage output containing `index.json`
/// * `output_dir` - Destination for feature archives and `index.json`
/// * `config` - Pipeline configuration
/// * `augment` - Add training noise (`data.noise_augmentation_std`)
/// * `jobs` - Worker threads (0 = all cores but one)
///
/// # Errors
///
/// [`PipelineError::MissingIndex`] when the label index is absent; other
/// run-level failures as for the label stage
pub fn run_feature_stage(
    input_dir: &Path,
    output_dir: &Path,
    config: &PipelineConfig,
    augment: bool,
    jobs: usize,
) -> Result<FeatureIndex, PipelineError> {
    let label_index: LabelIndex = read_index(input_dir)?;
    let extractor = FeatureExtractor::new(config)?;
    fs::create_dir_all(output_dir)?;

    log::info!(
        "Extracting features for {} conversations from {}{}",
        label_index.files.len(),
        input_dir.display(),
        if augment { " (augmented)" } else { "" }
    );

    let sources: Vec<PathBuf> = label_index
        .files
        .iter()
        .map(|listed| resolve_listed(input_dir, listed))
        .collect();

    let pool = build_pool(jobs)?;
    let stats = pool.install(|| {
        sources
            .par_iter()
            .fold(CorpusStats::default, |stats, source| {
                featurize_archive(stats, source, output_dir, &extractor, augment)
            })
            .reduce(CorpusStats::default, CorpusStats::merge)
    });

    let index = FeatureIndex {
        files: stats.files.clone(),
        total_windows: stats.total_windows,
        feature_dim: FEATURE_DIM,
        context_frames: config.model.context_frames,
        absent: stats.absent.clone(),
        failed: stats.failed.clone(),
    };
    write_index(output_dir, &index)?;

    log::info!(
        "Extracted features for {} windows ({} absent, {} failed) -> {}",
        index.total_windows,
        index.absent.len(),
        index.failed.len(),
        output_dir.display()
    );

    Ok(index)
}

/// Featurize one label archive and fold the outcome into `stats`
fn featurize_archive(
    stats: CorpusStats,
    source: &Path,
    output_dir: &Path,
    extractor: &FeatureExtractor,
    augment: bool,
) -> CorpusStats {
    let id = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string());

    let (examples, windows) = match featurize(source, extractor, augment) {
        Ok((examples, _)) if examples.is_empty() => {
            log::info!("{}: no windows, skipping", id);
            return stats.with_absent(id);
        }
        Ok(featurized) => featurized,
        Err(e) => {
            log::warn!("{}: feature extraction failed: {}", id, e);
            return stats.with_failure(id);
        }
    };

    let out_path = output_dir.join(format!("{}.npz", id));
    if let Err(e) = write_feature_archive(&out_path, &examples) {
        log::warn!("{}: could not write {}: {}", id, out_path.display(), e);
        return stats.with_failure(id);
    }

    stats.with_archive(out_path, windows.iter().map(|w| w.majority_label))
}

fn featurize(
    source: &Path,
    extractor: &FeatureExtractor,
    augment: bool,
) -> Result<(TrainingExamples, Vec<Window>), PipelineError> {
    let archive = LabelArchive::read(source)?;
    if archive.sample_rate != extractor.sample_rate() {
        return Err(PipelineError::InvalidInput(format!(
            "archive sample rate {} Hz does not match configured {} Hz",
            archive.sample_rate,
            extractor.sample_rate()
        )));
    }

    let windows = archive.windows()?;
    if windows.is_empty() {
        let examples = TrainingExamples {
            features: Array3::zeros((0, 0, FEATURE_DIM)),
            labels: Array1::zeros(0),
        };
        return Ok((examples, windows));
    }

    let audio = archive.audio.to_vec();
    let features = extractor.extract_all(&audio, augment)?;
    if features.nrows() < archive.frame_labels.len() {
        log::debug!(
            "{}: {} feature frames for {} labelled frames",
            source.display(),
            features.nrows(),
            archive.frame_labels.len()
        );
    }

    let examples = TrainingExamples::from_windows(features.view(), &windows)?;
    Ok((examples, windows))
}

/// Load every feature archive listed in a feature-stage index
///
/// # Returns
///
/// `(features, labels)` with shapes `(N, context_frames, 17)` and `(N,)`,
/// concatenated in index order
///
/// # Errors
///
/// [`PipelineError::MissingIndex`] when the index is absent, `Archive` when the
/// index declares a feature width other than 17, or an archive is unreadable
/// or its window shape disagrees with the index
pub fn load_feature_dataset(dir: &Path) -> Result<(Array3<f32>, Array1<i64>), PipelineError> {
    let index: FeatureIndex = read_index(dir)?;
    if index.feature_dim != FEATURE_DIM {
        return Err(PipelineError::Archive(format!(
            "{}: index feature_dim {} is not {}",
            dir.display(),
            index.feature_dim,
            FEATURE_DIM
        )));
    }

    let mut parts = Vec::with_capacity(index.files.len());
    for listed in &index.files {
        let path = resolve_listed(dir, listed);
        let examples = read_feature_archive(&path)?;
        let shape = examples.features.shape();
        if shape[1] != index.context_frames || shape[2] != index.feature_dim {
            return Err(PipelineError::Archive(format!(
                "{}: window shape {:?} does not match index ({}, {})",
                path.display(),
                &shape[1..],
                index.context_frames,
                index.feature_dim
            )));
        }
        parts.push(examples);
    }

    if parts.is_empty() {
        return Ok((
            Array3::zeros((0, index.context_frames, index.feature_dim)),
            Array1::zeros(0),
        ));
    }

    let feature_views: Vec<ArrayView3<'_, f32>> = parts.iter().map(|p| p.features.view()).collect();
    let label_views: Vec<ArrayView1<'_, i64>> = parts.iter().map(|p| p.labels.view()).collect();
    let features = concatenate(Axis(0), &feature_views)
        .map_err(|e| PipelineError::Archive(format!("Cannot concatenate feature archives: {}", e)))?;
    let labels = concatenate(Axis(0), &label_views)
        .map_err(|e| PipelineError::Archive(format!("Cannot concatenate label vectors: {}", e)))?;

    log::info!(
        "Loaded {} windows from {} feature archives in {}",
        labels.len(),
        parts.len(),
        dir.display()
    );

    Ok((features, labels))
}
