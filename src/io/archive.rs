//! Per-recording `.npz` archives
//!
//! Two archive kinds are produced, both readable with `numpy.load`:
//!
//! - label archives: `audio`, `frame_labels`, `window_indices`, `window_labels`, `sr`
//! - feature archives: `features`, `labels`

use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;

use ndarray::{arr0, Array, Array0, Array1, Array2, Dimension};
use ndarray_npy::{NpzReader, NpzWriter, ReadableElement};

use crate::error::PipelineError;
use crate::features::TrainingExamples;
use crate::labels::frame_labeler::label_indices;
use crate::labels::{TurnLabel, Window};

/// Labelled audio for one recording, as persisted by the label stage
#[derive(Debug, Clone, PartialEq)]
pub struct LabelArchive {
    /// Mono audio at `sample_rate`
    pub audio: Array1<f32>,

    /// Label index per frame
    pub frame_labels: Array1<i64>,

    /// `(n_windows, 2)` rows of `[start_frame, end_frame)`
    pub window_indices: Array2<i64>,

    /// Majority label index per window
    pub window_labels: Array1<i64>,

    /// Sample rate of `audio`
    pub sample_rate: u32,
}

impl LabelArchive {
    /// Pack labelled audio and its windows
    pub fn new(audio: Vec<f32>, frame_labels: &[TurnLabel], windows: &[Window], sample_rate: u32) -> Self {
        let mut window_indices = Array2::<i64>::zeros((windows.len(), 2));
        for (mut row, window) in window_indices.outer_iter_mut().zip(windows) {
            row[0] = window.start_frame as i64;
            row[1] = window.end_frame as i64;
        }

        Self {
            audio: Array1::from(audio),
            frame_labels: Array1::from(label_indices(frame_labels)),
            window_indices,
            window_labels: windows.iter().map(|w| w.majority_label.index() as i64).collect(),
            sample_rate,
        }
    }

    /// Number of windows
    pub fn window_count(&self) -> usize {
        self.window_labels.len()
    }

    /// Rebuild the windows from their persisted index pairs
    pub fn windows(&self) -> Result<Vec<Window>, PipelineError> {
        if self.window_indices.nrows() != self.window_labels.len() || self.window_indices.ncols() != 2 {
            return Err(PipelineError::Archive(format!(
                "window_indices {:?} does not match {} window labels",
                self.window_indices.shape(),
                self.window_labels.len()
            )));
        }

        self.window_indices
            .outer_iter()
            .zip(self.window_labels.iter())
            .map(|(row, &label)| {
                let (start, end) = (row[0], row[1]);
                if start < 0 || end < start {
                    return Err(PipelineError::Archive(format!("Invalid window [{}, {})", start, end)));
                }
                let majority_label = usize::try_from(label)
                    .ok()
                    .and_then(TurnLabel::from_index)
                    .ok_or_else(|| PipelineError::Archive(format!("Unknown label index {}", label)))?;
                Ok(Window {
                    start_frame: start as usize,
                    end_frame: end as usize,
                    majority_label,
                })
            })
            .collect()
    }

    /// Write as `.npz`
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let path = path.as_ref();
        let mut npz = NpzWriter::new(BufWriter::new(File::create(path)?));
        let sr: Array0<i64> = arr0(self.sample_rate as i64);

        npz.add_array("audio", &self.audio).map_err(|e| archive_error(path, e))?;
        npz.add_array("frame_labels", &self.frame_labels)
            .map_err(|e| archive_error(path, e))?;
        npz.add_array("window_indices", &self.window_indices)
            .map_err(|e| archive_error(path, e))?;
        npz.add_array("window_labels", &self.window_labels)
            .map_err(|e| archive_error(path, e))?;
        npz.add_array("sr", &sr).map_err(|e| archive_error(path, e))?;
        npz.finish().map_err(|e| archive_error(path, e))?.flush()?;

        log::debug!(
            "Wrote label archive {} ({} frames, {} windows)",
            path.display(),
            self.frame_labels.len(),
            self.window_count()
        );
        Ok(())
    }

    /// Read a label archive
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let mut npz = NpzReader::new(File::open(path)?).map_err(|e| archive_error(path, e))?;

        let sr: Array0<i64> = read_array(&mut npz, path, "sr")?;
        let sample_rate = u32::try_from(sr.into_scalar())
            .map_err(|_| PipelineError::Archive(format!("{}: invalid sample rate", path.display())))?;

        Ok(Self {
            audio: read_array(&mut npz, path, "audio")?,
            frame_labels: read_array(&mut npz, path, "frame_labels")?,
            window_indices: read_array(&mut npz, path, "window_indices")?,
            window_labels: read_array(&mut npz, path, "window_labels")?,
            sample_rate,
        })
    }
}

/// Write windowed features and labels as `.npz`
pub fn write_feature_archive<P: AsRef<Path>>(path: P, examples: &TrainingExamples) -> Result<(), PipelineError> {
    let path = path.as_ref();
    let mut npz = NpzWriter::new(BufWriter::new(File::create(path)?));
    npz.add_array("features", &examples.features)
        .map_err(|e| archive_error(path, e))?;
    npz.add_array("labels", &examples.labels)
        .map_err(|e| archive_error(path, e))?;
    npz.finish().map_err(|e| archive_error(path, e))?.flush()?;

    log::debug!(
        "Wrote feature archive {} (shape {:?})",
        path.display(),
        examples.features.shape()
    );
    Ok(())
}

/// Read windowed features and labels
pub fn read_feature_archive<P: AsRef<Path>>(path: P) -> Result<TrainingExamples, PipelineError> {
    let path = path.as_ref();
    let mut npz = NpzReader::new(File::open(path)?).map_err(|e| archive_error(path, e))?;
    let examples = TrainingExamples {
        features: read_array(&mut npz, path, "features")?,
        labels: read_array(&mut npz, path, "labels")?,
    };
    if examples.features.shape()[0] != examples.labels.len() {
        return Err(PipelineError::Archive(format!(
            "{}: {} feature windows but {} labels",
            path.display(),
            examples.features.shape()[0],
            examples.labels.len()
        )));
    }
    Ok(examples)
}

/// Look an array up by its bare name, falling back to the `.npy` entry name
fn read_array<R, T, D>(npz: &mut NpzReader<R>, path: &Path, name: &str) -> Result<Array<T, D>, PipelineError>
where
    R: Read + Seek,
    T: ReadableElement,
    D: Dimension,
{
    match npz.by_name(name) {
        Ok(array) => Ok(array),
        Err(_) => npz
            .by_name(&format!("{}.npy", name))
            .map_err(|e| PipelineError::Archive(format!("{}: array '{}': {}", path.display(), name, e))),
    }
}

fn archive_error(path: &Path, e: impl std::fmt::Display) -> PipelineError {
    PipelineError::Archive(format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn sample_windows() -> Vec<Window> {
        vec![
            Window {
                start_frame: 0,
                end_frame: 4,
                majority_label: TurnLabel::Speaking,
            },
            Window {
                start_frame: 2,
                end_frame: 6,
                majority_label: TurnLabel::InterruptIntent,
            },
        ]
    }

    #[test]
    fn test_label_archive_preserves_windows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conv_000.npz");
        let labels = vec![
            TurnLabel::Speaking,
            TurnLabel::Speaking,
            TurnLabel::InterruptIntent,
            TurnLabel::InterruptIntent,
            TurnLabel::InterruptIntent,
            TurnLabel::ThinkingPause,
        ];
        let archive = LabelArchive::new(vec![0.1, -0.2, 0.3], &labels, &sample_windows(), 16000);
        archive.write(&path).unwrap();

        let loaded = LabelArchive::read(&path).unwrap();
        assert_eq!(loaded, archive);
        assert_eq!(loaded.sample_rate, 16000);
        assert_eq!(loaded.frame_labels.to_vec(), vec![0, 0, 3, 3, 3, 1]);
        assert_eq!(loaded.windows().unwrap(), sample_windows());
    }

    #[test]
    fn test_feature_archive_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conv_001.npz");
        let examples = TrainingExamples {
            features: Array3::from_shape_fn((3, 5, 17), |(w, f, c)| (w * 1000 + f * 10 + c) as f32),
            labels: Array1::from(vec![2, 0, 1]),
        };
        write_feature_archive(&path, &examples).unwrap();

        let loaded = read_feature_archive(&path).unwrap();
        assert_eq!(loaded.features.shape(), &[3, 5, 17]);
        assert_eq!(loaded, examples);
    }

    #[test]
    fn test_bad_window_label_rejected() {
        let mut archive = LabelArchive::new(vec![], &[], &sample_windows(), 16000);
        archive.window_labels[1] = 9;
        assert!(archive.windows().is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(LabelArchive::read("/nonexistent/archive.npz").is_err());
    }
}
