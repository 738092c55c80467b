//! Short-time cepstral coefficients
//!
//! Computes 13 mel-frequency cepstral coefficients per centered frame.
//!
//! Algorithm:
//! 1. Hamming-window each `n_fft` frame (periodic window)
//! 2. Power spectrum via FFT, bins `0..=n_fft/2`
//! 3. Project onto a Slaney-style mel filterbank (area-normalized triangles, 0 Hz to Nyquist)
//! 4. Convert to dB with a 1e-10 floor, then clip to 80 dB below the recording's peak
//! 5. Orthonormal DCT-II, keep the first `n_coeffs`
//!
//! The inference-side extractor implements the same chain; agreement is
//! expected within a small tolerance, not bit-for-bit.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::framing::{pad_center, Frames};
use crate::error::PipelineError;

/// Floor applied to power before taking the logarithm
const AMIN: f32 = 1e-10;

/// Dynamic range kept below the loudest mel bin of a recording
const TOP_DB: f32 = 80.0;

/// Periodic Hamming window of length `n`
pub fn hamming_window(n: usize) -> Vec<f32> {
    if n <= 1 {
        return vec![1.0; n];
    }
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f32 / n as f32).cos())
        .collect()
}

/// Hz to mel (Slaney: linear below 1 kHz, logarithmic above)
fn hz_to_mel(hz: f64) -> f64 {
    const F_SP: f64 = 200.0 / 3.0;
    const MIN_LOG_HZ: f64 = 1000.0;
    let min_log_mel = MIN_LOG_HZ / F_SP;
    let logstep = (6.4f64).ln() / 27.0;
    if hz >= MIN_LOG_HZ {
        min_log_mel + (hz / MIN_LOG_HZ).ln() / logstep
    } else {
        hz / F_SP
    }
}

/// Mel to Hz, inverse of [`hz_to_mel`]
fn mel_to_hz(mel: f64) -> f64 {
    const F_SP: f64 = 200.0 / 3.0;
    const MIN_LOG_HZ: f64 = 1000.0;
    let min_log_mel = MIN_LOG_HZ / F_SP;
    let logstep = (6.4f64).ln() / 27.0;
    if mel >= min_log_mel {
        MIN_LOG_HZ * (logstep * (mel - min_log_mel)).exp()
    } else {
        F_SP * mel
    }
}

/// Mel filterbank matrix `[n_mels][n_fft / 2 + 1]`
///
/// Triangles are evaluated on the exact FFT bin frequencies (no rounding to
/// bins) and scaled by `2 / (f_right - f_left)` so each has unit area.
pub fn mel_filter_bank(n_mels: usize, n_fft: usize, sample_rate: u32, fmin: f64, fmax: f64) -> Vec<Vec<f32>> {
    let n_bins = n_fft / 2 + 1;
    let fft_freqs: Vec<f64> = (0..n_bins)
        .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
        .collect();

    let min_mel = hz_to_mel(fmin);
    let max_mel = hz_to_mel(fmax);
    let mel_points: Vec<f64> = (0..n_mels + 2)
        .map(|i| mel_to_hz(min_mel + (max_mel - min_mel) * i as f64 / (n_mels + 1) as f64))
        .collect();

    let mut bank = Vec::with_capacity(n_mels);
    for m in 0..n_mels {
        let (left, center, right) = (mel_points[m], mel_points[m + 1], mel_points[m + 2]);
        let lower_width = center - left;
        let upper_width = right - center;
        let enorm = 2.0 / (right - left);

        let filter: Vec<f32> = fft_freqs
            .iter()
            .map(|&f| {
                let lower = (f - left) / lower_width;
                let upper = (right - f) / upper_width;
                (lower.min(upper).max(0.0) * enorm) as f32
            })
            .collect();
        bank.push(filter);
    }
    bank
}

/// Orthonormal DCT-II basis `[n_coeffs][n_inputs]`
fn dct_basis(n_coeffs: usize, n_inputs: usize) -> Vec<Vec<f32>> {
    let n = n_inputs as f64;
    (0..n_coeffs)
        .map(|k| {
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            (0..n_inputs)
                .map(|i| {
                    let angle = std::f64::consts::PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n);
                    (scale * angle.cos()) as f32
                })
                .collect()
        })
        .collect()
}

/// Cepstral coefficient analyzer with precomputed window, filterbank and FFT plan
pub struct SpectralAnalyzer {
    n_fft: usize,
    hop: usize,
    window: Vec<f32>,
    mel_bank: Vec<Vec<f32>>,
    dct: Vec<Vec<f32>>,
    fft: Arc<dyn Fft<f32>>,
}

impl std::fmt::Debug for SpectralAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectralAnalyzer")
            .field("n_fft", &self.n_fft)
            .field("hop", &self.hop)
            .field("n_mels", &self.mel_bank.len())
            .field("n_coeffs", &self.dct.len())
            .finish()
    }
}

impl SpectralAnalyzer {
    /// Build an analyzer
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Sample rate in Hz
    /// * `n_fft` - Frame length in samples (also the FFT size)
    /// * `hop` - Hop length in samples
    /// * `n_mels` - Number of mel bands
    /// * `n_coeffs` - Number of cepstral coefficients kept
    pub fn new(
        sample_rate: u32,
        n_fft: usize,
        hop: usize,
        n_mels: usize,
        n_coeffs: usize,
    ) -> Result<Self, PipelineError> {
        if n_fft < 2 || hop == 0 {
            return Err(PipelineError::InvalidInput(format!(
                "Invalid framing: n_fft={}, hop={}",
                n_fft, hop
            )));
        }
        if n_mels == 0 || n_coeffs == 0 || n_coeffs > n_mels {
            return Err(PipelineError::InvalidInput(format!(
                "Invalid cepstral setup: n_mels={}, n_coeffs={}",
                n_mels, n_coeffs
            )));
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n_fft);

        Ok(Self {
            n_fft,
            hop,
            window: hamming_window(n_fft),
            mel_bank: mel_filter_bank(n_mels, n_fft, sample_rate, 0.0, sample_rate as f64 / 2.0),
            dct: dct_basis(n_coeffs, n_mels),
            fft,
        })
    }

    /// Mel power spectrogram `[n_frames][n_mels]`
    pub fn mel_spectrogram(&self, samples: &[f32]) -> Vec<Vec<f32>> {
        let padded = pad_center(samples, self.n_fft);
        let n_bins = self.n_fft / 2 + 1;
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.n_fft];
        let mut scratch = vec![Complex::new(0.0f32, 0.0); self.fft.get_inplace_scratch_len()];
        let mut power = vec![0.0f32; n_bins];

        Frames::new(&padded, self.n_fft, self.hop)
            .map(|frame| {
                for ((slot, &x), &w) in buffer.iter_mut().zip(frame).zip(&self.window) {
                    *slot = Complex::new(x * w, 0.0);
                }
                self.fft.process_with_scratch(&mut buffer, &mut scratch);
                for (p, c) in power.iter_mut().zip(&buffer[..n_bins]) {
                    *p = c.norm_sqr();
                }
                self.mel_bank
                    .iter()
                    .map(|filter| filter.iter().zip(&power).map(|(&w, &p)| w * p).sum::<f32>())
                    .collect()
            })
            .collect()
    }

    /// Cepstral coefficients `[n_frames][n_coeffs]`
    pub fn compute(&self, samples: &[f32]) -> Vec<Vec<f32>> {
        let mel = self.mel_spectrogram(samples);

        let mut log_mel: Vec<Vec<f32>> = mel
            .iter()
            .map(|frame| frame.iter().map(|&p| 10.0 * p.max(AMIN).log10()).collect())
            .collect();

        // Dynamic-range clip relative to the loudest bin of the whole recording
        let peak_db = log_mel
            .iter()
            .flat_map(|frame| frame.iter().copied())
            .fold(f32::NEG_INFINITY, f32::max);
        if peak_db.is_finite() {
            let floor = peak_db - TOP_DB;
            for value in log_mel.iter_mut().flat_map(|frame| frame.iter_mut()) {
                *value = value.max(floor);
            }
        }

        let coeffs: Vec<Vec<f32>> = log_mel
            .iter()
            .map(|frame| {
                self.dct
                    .iter()
                    .map(|basis| basis.iter().zip(frame).map(|(&b, &x)| b * x).sum::<f32>())
                    .collect()
            })
            .collect();

        log::debug!(
            "Computed {} cepstral frames ({} coeffs, peak {:.1} dB)",
            coeffs.len(),
            self.dct.len(),
            peak_db
        );

        coeffs
    }
}
