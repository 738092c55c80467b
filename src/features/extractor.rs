//! Whole-recording feature extraction
//!
//! Runs every estimator over one recording, reconciles their frame counts to
//! the shortest stream, normalizes, and stacks the 17 columns:
//!
//! | columns | feature                         | post-processing          |
//! |---------|---------------------------------|--------------------------|
//! | 0..13   | cepstral coefficients           | per-recording z-score    |
//! | 13      | RMS energy                      | per-recording z-score    |
//! | 14      | f0 (unvoiced = 0)               | divided by 500           |
//! | 15      | speech rate                     | already scaled           |
//! | 16      | pause duration                  | already scaled           |
//!
//! # Example
//!
//! ```no_run
//! use turnprep::{FeatureExtractor, PipelineConfig};
//!
//! let extractor = FeatureExtractor::new(&PipelineConfig::default())?;
//! let samples = vec![0.0f32; 16000 * 5];
//! let features = extractor.extract_all(&samples, false)?;
//! assert_eq!(features.ncols(), 17);
//! # Ok::<(), turnprep::PipelineError>(())
//! ```

use ndarray::{s, Array2};
use rand::Rng;

use super::augmentation::add_gaussian_noise;
use super::energy::rms_energy;
use super::framing::centered_frame_count;
use super::normalization::normalize_columns;
use super::pause::estimate_pause_duration;
use super::pitch::{PitchConfig, PitchTracker};
use super::spectral::SpectralAnalyzer;
use super::speech_rate::estimate_speech_rate;
use super::{ENERGY_COLUMN, FEATURE_DIM, NUM_SPECTRAL_COEFFS, PAUSE_COLUMN, PITCH_COLUMN, SPEECH_RATE_COLUMN};
use crate::config::PipelineConfig;
use crate::error::PipelineError;

/// Divisor applied to f0 after alignment
pub const PITCH_SCALE: f32 = 500.0;

/// Raw per-frame streams before reconciliation
#[derive(Debug, Clone)]
pub struct FeatureStreams {
    /// Cepstral coefficients per frame
    pub spectral: Vec<Vec<f32>>,
    /// RMS energy per frame
    pub energy: Vec<f32>,
    /// f0 in Hz per frame
    pub pitch: Vec<f32>,
    /// Scaled speech rate per frame
    pub speech_rate: Vec<f32>,
    /// Scaled pause duration per frame
    pub pause: Vec<f32>,
}

impl FeatureStreams {
    /// Common frame count: the minimum over all streams
    pub fn aligned_len(&self) -> usize {
        [
            self.spectral.len(),
            self.energy.len(),
            self.pitch.len(),
            self.speech_rate.len(),
            self.pause.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0)
    }
}

/// 17-dimensional feature extractor
#[derive(Debug)]
pub struct FeatureExtractor {
    sample_rate: u32,
    n_fft: usize,
    hop: usize,
    frame_shift_ms: u32,
    noise_std: f32,
    spectral: SpectralAnalyzer,
    pitch: PitchTracker,
}

impl FeatureExtractor {
    /// Build an extractor from the pipeline configuration
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let n_fft = config.n_fft();
        let hop = config.hop_length();
        let data = &config.data;

        Ok(Self {
            sample_rate: data.sample_rate,
            n_fft,
            hop,
            frame_shift_ms: data.frame_shift_ms,
            noise_std: data.noise_augmentation_std,
            spectral: SpectralAnalyzer::new(data.sample_rate, n_fft, hop, data.num_mels, data.num_mfcc)?,
            pitch: PitchTracker::new(data.sample_rate, hop, PitchConfig::default())?,
        })
    }

    /// Sample rate the extractor expects
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Run every estimator without reconciling lengths
    pub fn compute_streams(&self, samples: &[f32]) -> Result<FeatureStreams, PipelineError> {
        if samples.is_empty() {
            return Err(PipelineError::InvalidInput("Empty audio samples".to_string()));
        }
        if let Some(pos) = samples.iter().position(|x| !x.is_finite()) {
            return Err(PipelineError::NumericalError(format!(
                "Non-finite audio sample at index {}",
                pos
            )));
        }

        let spectral = self.spectral.compute(samples);
        let energy = rms_energy(samples, self.n_fft, self.hop);
        let pitch = self.pitch.track(samples);

        let frames_per_second = self.sample_rate as usize / self.hop;
        let speech_rate = estimate_speech_rate(&energy, frames_per_second, self.frame_shift_ms);
        let pause = estimate_pause_duration(&energy, self.frame_shift_ms);

        Ok(FeatureStreams {
            spectral,
            energy,
            pitch,
            speech_rate,
            pause,
        })
    }

    /// Extract the `(n_frames, 17)` feature matrix
    ///
    /// # Arguments
    ///
    /// * `samples` - Mono samples at [`Self::sample_rate`]
    /// * `augment` - Add Gaussian noise with the configured std (training only)
    pub fn extract_all(&self, samples: &[f32], augment: bool) -> Result<Array2<f32>, PipelineError> {
        if augment {
            self.extract_augmented(samples, &mut rand::thread_rng())
        } else {
            self.extract(samples)
        }
    }

    /// Extract with noise drawn from a caller-supplied generator
    pub fn extract_augmented<R: Rng + ?Sized>(
        &self,
        samples: &[f32],
        rng: &mut R,
    ) -> Result<Array2<f32>, PipelineError> {
        let mut features = self.extract(samples)?;
        add_gaussian_noise(&mut features, self.noise_std, rng)?;
        Ok(features)
    }

    /// Extract without augmentation (evaluation / inference parity path)
    pub fn extract(&self, samples: &[f32]) -> Result<Array2<f32>, PipelineError> {
        let streams = self.compute_streams(samples)?;
        let n_frames = streams.aligned_len();

        let expected = centered_frame_count(samples.len(), self.n_fft, self.hop);
        if n_frames != expected || streams.pitch.len() != expected {
            log::debug!(
                "Reconciling stream lengths to {} (expected={}, spectral={}, energy={}, pitch={})",
                n_frames,
                expected,
                streams.spectral.len(),
                streams.energy.len(),
                streams.pitch.len()
            );
        }

        let mut features = Array2::<f32>::zeros((n_frames, FEATURE_DIM));
        for (i, mut row) in features.outer_iter_mut().enumerate() {
            for (c, &value) in streams.spectral[i].iter().take(NUM_SPECTRAL_COEFFS).enumerate() {
                row[c] = value;
            }
            row[ENERGY_COLUMN] = streams.energy[i];
            row[PITCH_COLUMN] = streams.pitch[i] / PITCH_SCALE;
            row[SPEECH_RATE_COLUMN] = streams.speech_rate[i];
            row[PAUSE_COLUMN] = streams.pause[i];
        }

        normalize_columns(features.slice_mut(s![.., ..=ENERGY_COLUMN]));

        log::debug!(
            "Extracted {} feature frames from {} samples ({:.2}s)",
            n_frames,
            samples.len(),
            samples.len() as f32 / self.sample_rate as f32
        );

        Ok(features)
    }
}
