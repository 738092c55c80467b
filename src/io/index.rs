//! Corpus index documents (`index.json`)

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// File name of every stage index
pub const INDEX_FILE_NAME: &str = "index.json";

/// Corpus index written by the label stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelIndex {
    /// Label archives, in manifest order
    pub files: Vec<PathBuf>,

    /// Windows across all archives
    pub total_windows: u64,

    /// Window count per label name
    pub label_distribution: BTreeMap<String, u64>,

    /// Inverse-frequency class weights, summing to the class count
    #[serde(default)]
    pub class_weights: BTreeMap<String, f64>,

    /// Recordings skipped because they produced no windows
    #[serde(default)]
    pub absent: Vec<String>,

    /// Recordings that failed to process
    #[serde(default)]
    pub failed: Vec<String>,
}

/// Corpus index written by the feature stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureIndex {
    /// Feature archives, in label-index order
    pub files: Vec<PathBuf>,

    /// Windows across all archives
    pub total_windows: u64,

    /// Width of a feature frame
    pub feature_dim: usize,

    /// Frames per window
    pub context_frames: usize,

    /// Recordings skipped because they produced no windows
    #[serde(default)]
    pub absent: Vec<String>,

    /// Recordings that failed to process
    #[serde(default)]
    pub failed: Vec<String>,
}

/// Path of the index inside a stage directory
pub fn index_path(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILE_NAME)
}

/// Read a stage index; a missing file is [`PipelineError::MissingIndex`]
pub fn read_index<T: DeserializeOwned>(dir: &Path) -> Result<T, PipelineError> {
    let path = index_path(dir);
    if !path.is_file() {
        return Err(PipelineError::MissingIndex(path));
    }
    let reader = BufReader::new(File::open(&path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Write a stage index as pretty-printed JSON
pub fn write_index<T: Serialize>(dir: &Path, index: &T) -> Result<PathBuf, PipelineError> {
    let path = index_path(dir);
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, index)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    log::debug!("Wrote {}", path.display());
    Ok(path)
}

/// Resolve an archive path listed in an index
///
/// Listed paths are used as-is when they exist; otherwise the file name is
/// looked up next to the index, so a stage directory can be moved.
pub fn resolve_listed(dir: &Path, listed: &Path) -> PathBuf {
    if listed.exists() {
        return listed.to_path_buf();
    }
    match listed.file_name() {
        Some(name) => dir.join(name),
        None => listed.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_index_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_index::<LabelIndex>(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingIndex(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_roundtrip_and_layout() {
        let dir = tempfile::tempdir().unwrap();
        let index = FeatureIndex {
            files: vec![dir.path().join("a.npz")],
            total_windows: 12,
            feature_dim: 17,
            context_frames: 100,
            ..Default::default()
        };
        write_index(dir.path(), &index).unwrap();

        let text = std::fs::read_to_string(index_path(dir.path())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["feature_dim"], 17);
        assert_eq!(value["context_frames"], 100);

        let loaded: FeatureIndex = read_index(dir.path()).unwrap();
        assert_eq!(loaded, index);
    }

    #[test]
    fn test_legacy_label_index_without_extras() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            index_path(dir.path()),
            r#"{"files": ["x/conv_000.npz"], "total_windows": 3,
                "label_distribution": {"speaking": 1, "thinking_pause": 2, "turn_complete": 0, "interrupt_intent": 0}}"#,
        )
        .unwrap();
        let index: LabelIndex = read_index(dir.path()).unwrap();
        assert_eq!(index.total_windows, 3);
        assert!(index.class_weights.is_empty());
        assert!(index.failed.is_empty());
    }

    #[test]
    fn test_resolve_listed_falls_back_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let moved = Path::new("/old/location/conv_007.npz");
        assert_eq!(resolve_listed(dir.path(), moved), dir.path().join("conv_007.npz"));
    }
}
