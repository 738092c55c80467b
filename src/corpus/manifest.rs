//! Corpus manifest (`manifest.json`)

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// File name of the corpus manifest
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// One recording listed in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Recording identifier; names the output archives
    pub id: String,

    /// Audio file, relative to the corpus directory
    #[serde(alias = "audio")]
    pub audio_path: PathBuf,

    /// Annotation file, relative to the corpus directory
    #[serde(alias = "annotations")]
    pub annotation_path: PathBuf,

    /// Nominal duration in seconds
    #[serde(default)]
    pub duration: f64,
}

impl ManifestEntry {
    /// Audio file resolved against the corpus directory
    pub fn audio_in(&self, corpus_dir: &Path) -> PathBuf {
        corpus_dir.join(&self.audio_path)
    }

    /// Annotation file resolved against the corpus directory
    pub fn annotations_in(&self, corpus_dir: &Path) -> PathBuf {
        corpus_dir.join(&self.annotation_path)
    }
}

/// Read `<corpus_dir>/manifest.json`
///
/// # Errors
///
/// [`PipelineError::MissingManifest`] if the file does not exist; this aborts
/// a corpus run. [`PipelineError::InvalidInput`] if two entries share an id,
/// since each id names exactly one archive.
pub fn load_manifest(corpus_dir: &Path) -> Result<Vec<ManifestEntry>, PipelineError> {
    let path = corpus_dir.join(MANIFEST_FILE_NAME);
    if !path.is_file() {
        return Err(PipelineError::MissingManifest(path));
    }

    let entries: Vec<ManifestEntry> = serde_json::from_reader(BufReader::new(File::open(&path)?))?;

    let mut seen = HashSet::with_capacity(entries.len());
    if let Some(dup) = entries.iter().find(|e| !seen.insert(e.id.as_str())) {
        return Err(PipelineError::InvalidInput(format!(
            "{}: duplicate recording id '{}'",
            path.display(),
            dup.id
        )));
    }

    log::debug!("Loaded {} manifest entries from {}", entries.len(), path.display());
    Ok(entries)
}
