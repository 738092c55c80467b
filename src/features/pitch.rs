//! Fundamental frequency estimation (YIN)
//!
//! Estimates f0 per centered frame with the YIN difference function.
//!
//! # Reference
//!
//! de Cheveigné, A., & Kawahara, H. (2002). YIN, a fundamental frequency estimator
//! for speech and music. *The Journal of the Acoustical Society of America*, 111(4), 1917-1930.
//!
//! # Algorithm
//!
//! 1. Frame the signal with a window of `2 * ceil(sr / fmin)` samples so the
//!    lowest admissible period fits twice, centered on `i * hop`
//! 2. Difference function `d(tau)` from FFT cross-correlation and energy prefix sums
//! 3. Cumulative mean normalized difference `d'(tau)`
//! 4. First `tau` in `[sr/fmax, sr/fmin]` with `d'(tau) < threshold`, descended to its local minimum
//! 5. Parabolic interpolation of the minimum, `f0 = sr / tau`
//!
//! Frames with no dip below the threshold, or an estimate outside
//! `[fmin, fmax]`, are unvoiced and reported as `0.0`.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::framing::{pad_center, Frames};
use crate::error::PipelineError;

/// Pitch estimation parameters
#[derive(Debug, Clone, Copy)]
pub struct PitchConfig {
    /// Lowest admissible f0 in Hz (default: 50)
    pub fmin: f32,

    /// Highest admissible f0 in Hz (default: 500)
    pub fmax: f32,

    /// Absolute threshold on the normalized difference (default: 0.1)
    pub threshold: f64,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            fmin: 50.0,
            fmax: 500.0,
            threshold: 0.1,
        }
    }
}

/// YIN pitch tracker with a precomputed FFT plan
pub struct PitchTracker {
    sample_rate: u32,
    hop: usize,
    config: PitchConfig,
    window_len: usize,
    tau_min: usize,
    tau_max: usize,
    fft_size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl std::fmt::Debug for PitchTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PitchTracker")
            .field("sample_rate", &self.sample_rate)
            .field("hop", &self.hop)
            .field("window_len", &self.window_len)
            .field("tau_min", &self.tau_min)
            .field("tau_max", &self.tau_max)
            .finish()
    }
}

impl PitchTracker {
    /// Build a tracker for the given sample rate and hop
    pub fn new(sample_rate: u32, hop: usize, config: PitchConfig) -> Result<Self, PipelineError> {
        if sample_rate == 0 || hop == 0 {
            return Err(PipelineError::InvalidInput(format!(
                "Invalid pitch framing: sample_rate={}, hop={}",
                sample_rate, hop
            )));
        }
        if !(config.fmin > 0.0 && config.fmin < config.fmax) {
            return Err(PipelineError::InvalidInput(format!(
                "Invalid pitch range: fmin={}, fmax={}",
                config.fmin, config.fmax
            )));
        }

        let sr = sample_rate as f32;
        let tau_max = (sr / config.fmin).ceil() as usize;
        let tau_min = ((sr / config.fmax).floor() as usize).max(2);
        if tau_min >= tau_max {
            return Err(PipelineError::InvalidInput(format!(
                "Pitch range {}-{} Hz is not resolvable at {} Hz",
                config.fmin, config.fmax, sample_rate
            )));
        }

        let window_len = 2 * tau_max;
        // Integration window (tau_max) correlated against the full frame
        let fft_size = (window_len + tau_max).next_power_of_two();

        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);

        Ok(Self {
            sample_rate,
            hop,
            config,
            window_len,
            tau_min,
            tau_max,
            fft_size,
            forward,
            inverse,
        })
    }

    /// Frame length used by the tracker, in samples
    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// f0 per centered frame in Hz, unvoiced frames as 0
    pub fn track(&self, samples: &[f32]) -> Vec<f32> {
        let padded = pad_center(samples, self.window_len);
        let mut a = vec![Complex::new(0.0f64, 0.0); self.fft_size];
        let mut b = vec![Complex::new(0.0f64, 0.0); self.fft_size];
        let mut cmnd = vec![0.0f64; self.tau_max + 1];

        let f0: Vec<f32> = Frames::new(&padded, self.window_len, self.hop)
            .map(|frame| self.frame_f0(frame, &mut a, &mut b, &mut cmnd))
            .collect();

        let voiced = f0.iter().filter(|&&f| f > 0.0).count();
        log::debug!(
            "Pitch: {} frames, {} voiced (window={}, tau={}..{})",
            f0.len(),
            voiced,
            self.window_len,
            self.tau_min,
            self.tau_max
        );

        f0
    }

    fn frame_f0(&self, frame: &[f32], a: &mut [Complex<f64>], b: &mut [Complex<f64>], cmnd: &mut [f64]) -> f32 {
        let w = self.tau_max;

        // Step 1: cross-correlation r(tau) = sum_{j<w} x[j] x[j+tau]
        for slot in a.iter_mut() {
            *slot = Complex::new(0.0, 0.0);
        }
        for slot in b.iter_mut() {
            *slot = Complex::new(0.0, 0.0);
        }
        for (j, &x) in frame.iter().enumerate() {
            b[j] = Complex::new(x as f64, 0.0);
            if j < w {
                a[j] = Complex::new(x as f64, 0.0);
            }
        }
        self.forward.process(a);
        self.forward.process(b);
        for (x, y) in a.iter_mut().zip(b.iter()) {
            *x = x.conj() * y;
        }
        self.inverse.process(a);
        let scale = 1.0 / self.fft_size as f64;

        // Step 2: energy prefix sums
        let mut prefix = Vec::with_capacity(frame.len() + 1);
        prefix.push(0.0f64);
        let mut acc = 0.0f64;
        for &x in frame {
            acc += x as f64 * x as f64;
            prefix.push(acc);
        }
        let energy = |start: usize| prefix[start + w] - prefix[start];

        // Step 3: cumulative mean normalized difference
        cmnd[0] = 1.0;
        let e0 = energy(0);
        let mut running = 0.0f64;
        for tau in 1..=self.tau_max {
            let d = (e0 + energy(tau) - 2.0 * a[tau].re * scale).max(0.0);
            running += d;
            cmnd[tau] = if running > 0.0 { d * tau as f64 / running } else { 1.0 };
        }

        // Step 4: absolute threshold, then descend to the local minimum
        let mut tau = self.tau_min;
        let mut found = None;
        while tau < self.tau_max {
            if cmnd[tau] < self.config.threshold {
                while tau + 1 < self.tau_max && cmnd[tau + 1] < cmnd[tau] {
                    tau += 1;
                }
                found = Some(tau);
                break;
            }
            tau += 1;
        }
        let Some(tau) = found else {
            return 0.0;
        };

        // Step 5: parabolic refinement
        let refined = if tau > 0 && tau < self.tau_max {
            let (s0, s1, s2) = (cmnd[tau - 1], cmnd[tau], cmnd[tau + 1]);
            let denom = s0 - 2.0 * s1 + s2;
            if denom.abs() > 1e-12 {
                tau as f64 + 0.5 * (s0 - s2) / denom
            } else {
                tau as f64
            }
        } else {
            tau as f64
        };

        if refined <= 0.0 {
            return 0.0;
        }
        let f0 = (self.sample_rate as f64 / refined) as f32;
        if f0 < self.config.fmin || f0 > self.config.fmax || !f0.is_finite() {
            0.0
        } else {
            f0
        }
    }
}
