//! Audio and dataset I/O
//!
//! Audio decoding (Symphonia), resampling (rubato), per-recording `.npz`
//! archives and the JSON corpus indexes.

pub mod archive;
pub mod decoder;
pub mod index;
pub mod resample;

pub use archive::{read_feature_archive, write_feature_archive, LabelArchive};
pub use decoder::{decode_audio, DecodedAudio};
pub use index::{FeatureIndex, LabelIndex};
pub use resample::resample;

use std::path::Path;

use crate::error::PipelineError;

/// Decode a file and bring it to `target_rate` mono
pub fn load_audio(path: &Path, target_rate: u32) -> Result<Vec<f32>, PipelineError> {
    let decoded = decode_audio(path)?;
    if decoded.sample_rate == target_rate {
        return Ok(decoded.samples);
    }
    resample(&decoded.samples, decoded.sample_rate, target_rate)
}
