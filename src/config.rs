//! Configuration parameters for label generation and feature extraction
//!
//! Mirrors the training YAML layout (`data`, `model`, `labels` sections) so the
//! same file drives both the Rust pipeline and the downstream trainer.
//!
//! ```no_run
//! use turnprep::PipelineConfig;
//!
//! let config = PipelineConfig::from_yaml_file("configs/hybrid_v1.yaml")?;
//! assert_eq!(config.n_fft(), 400);
//! # Ok::<(), turnprep::PipelineError>(())
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::features::{FEATURE_DIM, NUM_SPECTRAL_COEFFS};
use crate::labels::{TurnLabel, NUM_LABELS};

/// Audio framing and extraction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Sample rate every recording is brought to (default: 16000)
    pub sample_rate: u32,

    /// Analysis frame length in milliseconds (default: 25)
    pub frame_length_ms: u32,

    /// Shift between consecutive frames in milliseconds (default: 10)
    pub frame_shift_ms: u32,

    /// Number of cepstral coefficients (default: 13, fixed by the feature layout)
    pub num_mfcc: usize,

    /// Number of mel bands feeding the cepstral reduction (default: 40)
    pub num_mels: usize,

    /// Std of additive Gaussian noise used for training-time augmentation (default: 0.0)
    pub noise_augmentation_std: f32,

    /// Hop between consecutive windows in frames (default: 10)
    pub hop_frames: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            frame_length_ms: 25,
            frame_shift_ms: 10,
            num_mfcc: NUM_SPECTRAL_COEFFS,
            num_mels: 40,
            noise_augmentation_std: 0.0,
            hop_frames: 10,
        }
    }
}

/// Classifier input contract
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Frames per training example (default: 100 = 1 second at 10 ms shift)
    pub context_frames: usize,

    /// Number of output classes (default: 4)
    pub num_classes: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            context_frames: 100,
            num_classes: NUM_LABELS,
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Audio and framing parameters
    pub data: DataConfig,

    /// Classifier input contract
    pub model: ModelConfig,

    /// Label names in classifier output order
    pub labels: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            model: ModelConfig::default(),
            labels: TurnLabel::ALL.iter().map(|l| l.name().to_string()).collect(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a configuration from a YAML file
    ///
    /// Sections or keys absent from the file keep their defaults; keys the
    /// pipeline does not use (e.g. trainer hyper-parameters) are ignored.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        log::debug!("Loading pipeline config from {}", path.display());
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Parse and validate a configuration from YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self, PipelineError> {
        let config: PipelineConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// FFT / analysis window size in samples
    pub fn n_fft(&self) -> usize {
        (self.data.sample_rate as usize * self.data.frame_length_ms as usize) / 1000
    }

    /// Hop length in samples
    pub fn hop_length(&self) -> usize {
        (self.data.sample_rate as usize * self.data.frame_shift_ms as usize) / 1000
    }

    /// Check parameter consistency
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.data.sample_rate == 0 {
            return Err(PipelineError::InvalidInput(
                "Sample rate must be > 0".to_string(),
            ));
        }
        if self.data.frame_shift_ms == 0 || self.data.frame_length_ms == 0 {
            return Err(PipelineError::InvalidInput(
                "Frame length and frame shift must be > 0".to_string(),
            ));
        }
        if self.n_fft() == 0 || self.hop_length() == 0 {
            return Err(PipelineError::InvalidInput(format!(
                "Frame length {} ms / shift {} ms is below one sample at {} Hz",
                self.data.frame_length_ms, self.data.frame_shift_ms, self.data.sample_rate
            )));
        }
        if self.data.num_mfcc != NUM_SPECTRAL_COEFFS {
            return Err(PipelineError::InvalidInput(format!(
                "num_mfcc must be {} to produce {}-dim feature frames, got {}",
                NUM_SPECTRAL_COEFFS, FEATURE_DIM, self.data.num_mfcc
            )));
        }
        if self.data.num_mels < self.data.num_mfcc {
            return Err(PipelineError::InvalidInput(format!(
                "num_mels ({}) must be >= num_mfcc ({})",
                self.data.num_mels, self.data.num_mfcc
            )));
        }
        if self.data.noise_augmentation_std < 0.0 || !self.data.noise_augmentation_std.is_finite() {
            return Err(PipelineError::InvalidInput(format!(
                "noise_augmentation_std must be a finite value >= 0, got {}",
                self.data.noise_augmentation_std
            )));
        }
        if self.data.hop_frames == 0 || self.model.context_frames == 0 {
            return Err(PipelineError::InvalidInput(
                "hop_frames and context_frames must be > 0".to_string(),
            ));
        }
        let expected: Vec<&str> = TurnLabel::ALL.iter().map(|l| l.name()).collect();
        if self.labels.iter().map(String::as_str).ne(expected.iter().copied()) {
            return Err(PipelineError::InvalidInput(format!(
                "labels must be {:?} in class-index order, got {:?}",
                expected, self.labels
            )));
        }
        if self.model.num_classes != NUM_LABELS {
            return Err(PipelineError::InvalidInput(format!(
                "num_classes must be {}, got {}",
                NUM_LABELS, self.model.num_classes
            )));
        }
        Ok(())
    }
}
