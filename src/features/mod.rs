//! Feature extraction modules
//!
//! Produces one 17-dimensional feature frame per audio frame:
//! - 13 cepstral coefficients (normalized per recording)
//! - RMS energy (normalized per recording)
//! - Pitch estimate (scaled by 1/500, unvoiced = 0)
//! - Speech rate from energy peak counting (scaled by 1/10)
//! - Accumulated pause duration (capped at 5 s, scaled to [0, 1])
//!
//! and assembles fixed-length windows of those frames into training examples.

pub mod assembler;
pub mod augmentation;
pub mod energy;
pub mod extractor;
pub mod framing;
pub mod normalization;
pub mod pause;
pub mod peak_picking;
pub mod pitch;
pub mod spectral;
pub mod speech_rate;

pub use assembler::{assemble_windows, TrainingExamples};
pub use extractor::FeatureExtractor;

/// Number of spectral (cepstral) coefficients per frame
pub const NUM_SPECTRAL_COEFFS: usize = 13;

/// Width of a feature frame
pub const FEATURE_DIM: usize = 17;

/// Column of the normalized RMS energy
pub const ENERGY_COLUMN: usize = 13;

/// Column of the scaled pitch estimate
pub const PITCH_COLUMN: usize = 14;

/// Column of the scaled speech rate
pub const SPEECH_RATE_COLUMN: usize = 15;

/// Column of the scaled pause duration
pub const PAUSE_COLUMN: usize = 16;
