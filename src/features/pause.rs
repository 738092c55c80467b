//! Accumulated pause duration
//!
//! Tracks how long silence has lasted at each frame. The accumulator is an
//! explicit value threaded through a scan over frames: it grows by one frame
//! shift while energy stays below `0.3 x median(rms)` and resets to zero on
//! any frame at or above it. Output is capped at 5 s and scaled to [0, 1].

use super::energy::median;

/// Fraction of median energy below which a frame counts as silent
const SILENCE_THRESHOLD_RATIO: f32 = 0.3;

/// Pause length at which the feature saturates, in seconds
pub const MAX_PAUSE_SECONDS: f32 = 5.0;

/// Running pause accumulator
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PauseState {
    /// Silence accumulated so far in seconds
    pub accumulated: f64,
}

impl PauseState {
    /// Advance by one frame
    pub fn step(self, energy: f32, threshold: f32, frame_duration: f64) -> Self {
        if energy < threshold {
            Self {
                accumulated: self.accumulated + frame_duration,
            }
        } else {
            Self { accumulated: 0.0 }
        }
    }

    /// Feature value: capped and scaled to [0, 1]
    pub fn scaled(self) -> f32 {
        (self.accumulated as f32).min(MAX_PAUSE_SECONDS) / MAX_PAUSE_SECONDS
    }
}

/// Scaled pause duration per frame
///
/// # Arguments
///
/// * `rms` - RMS energy per frame
/// * `frame_shift_ms` - Frame shift in milliseconds
pub fn estimate_pause_duration(rms: &[f32], frame_shift_ms: u32) -> Vec<f32> {
    let threshold = median(rms) * SILENCE_THRESHOLD_RATIO;
    let frame_duration = frame_shift_ms as f64 / 1000.0;

    log::debug!(
        "Pause duration: {} frames, threshold={:.6}",
        rms.len(),
        threshold
    );

    rms.iter()
        .scan(PauseState::default(), |state, &energy| {
            *state = state.step(energy, threshold, frame_duration);
            Some(state.scaled())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resets_immediately_after_speech() {
        // median of [1,1,1,1,0,0,0,1,1] is 1 -> threshold 0.3
        let rms = vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0];
        let pause = estimate_pause_duration(&rms, 10);
        assert_eq!(pause[3], 0.0);
        assert!((pause[4] - 0.01 / 5.0).abs() < 1e-6);
        assert!((pause[6] - 0.03 / 5.0).abs() < 1e-6);
        assert_eq!(pause[7], 0.0);
        assert_eq!(pause[8], 0.0);
    }

    #[test]
    fn test_saturates_at_cap() {
        // 1 s of speech then 7 s of silence at 10 ms frames
        let mut rms = vec![1.0f32; 900];
        rms.extend(vec![0.0f32; 700]);
        let pause = estimate_pause_duration(&rms, 10);
        // 5 s of silence reached at the 500th silent frame
        assert!(pause[900 + 498] < 1.0);
        assert!((pause[900 + 499] - 1.0).abs() < 1e-6);
        assert_eq!(pause[1599], 1.0);
        assert!(pause.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_all_silent_never_accumulates() {
        // threshold collapses to zero and nothing is strictly below it
        let pause = estimate_pause_duration(&vec![0.0f32; 50], 10);
        assert!(pause.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_step_is_pure() {
        let state = PauseState::default().step(0.0, 0.5, 0.01).step(0.0, 0.5, 0.01);
        assert!((state.accumulated - 0.02).abs() < 1e-12);
        assert_eq!(state.step(0.5, 0.5, 0.01), PauseState::default());
    }
}
