//! Speech rate from energy-envelope peak counting
//!
//! Algorithm:
//! 1. Smooth frame energy with a length-5 moving average (skipped below 5 frames)
//! 2. Global threshold = 0.5 x median of the smoothed envelope
//! 3. For each frame `i`, count peaks (height >= threshold, spacing >= 3 frames)
//!    inside `[i - half, i + half)` where `half` is half a second of frames
//! 4. Divide by the actual window duration (shorter at the recording edges)
//! 5. Scale by 1/10 so typical speech (3-7 syllables/s) lands near [0, 1]

use super::energy::{median, moving_average};
use super::peak_picking::find_peaks;

/// Moving-average kernel applied before peak counting
const SMOOTHING_KERNEL: usize = 5;

/// Fraction of the median smoothed energy a peak must reach
const PEAK_THRESHOLD_RATIO: f32 = 0.5;

/// Minimum spacing between counted peaks in frames
const MIN_PEAK_DISTANCE: usize = 3;

/// Divisor mapping peaks/second into roughly [0, 1]
const RATE_SCALE: f32 = 10.0;

/// Estimate scaled speech rate per frame
///
/// # Arguments
///
/// * `rms` - RMS energy per frame
/// * `frames_per_second` - Frames in the one-second counting window (`sample_rate / hop`)
/// * `frame_shift_ms` - Frame shift in milliseconds
///
/// # Returns
///
/// One value per input frame
pub fn estimate_speech_rate(rms: &[f32], frames_per_second: usize, frame_shift_ms: u32) -> Vec<f32> {
    let n_frames = rms.len();
    if n_frames == 0 {
        return Vec::new();
    }

    let smoothed = moving_average(rms, SMOOTHING_KERNEL);
    let threshold = median(&smoothed) * PEAK_THRESHOLD_RATIO;
    let half_window = frames_per_second / 2;
    let frame_dur = frame_shift_ms as f32 / 1000.0;

    log::debug!(
        "Speech rate: {} frames, threshold={:.6}, half_window={}",
        n_frames,
        threshold,
        half_window
    );

    (0..n_frames)
        .map(|i| {
            let start = i.saturating_sub(half_window);
            let end = (i + half_window).min(n_frames);
            let window_duration = (end - start) as f32 * frame_dur;
            if window_duration <= 0.0 {
                return 0.0;
            }
            let peaks = find_peaks(&smoothed[start..end], threshold, MIN_PEAK_DISTANCE);
            peaks.len() as f32 / window_duration / RATE_SCALE
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Energy envelope with one bump every `period` frames
    fn bursts(n_frames: usize, period: usize) -> Vec<f32> {
        (0..n_frames)
            .map(|i| {
                let phase = (i % period) as f32 / period as f32;
                0.05 + (std::f32::consts::PI * phase).sin().powi(4)
            })
            .collect()
    }

    #[test]
    fn test_rate_tracks_burst_frequency() {
        // 5 bursts per second at 100 frames/s
        let rms = bursts(1000, 20);
        let rate = estimate_speech_rate(&rms, 100, 10);
        assert_eq!(rate.len(), 1000);
        // window [455, 555) holds peaks at 470, 490, 510, 530, 550
        let mid = rate[505];
        assert!(
            (mid - 0.5).abs() < 0.05,
            "Expected ~5 peaks/s (0.5 scaled), got {}",
            mid
        );
    }

    #[test]
    fn test_silence_has_zero_rate() {
        let rate = estimate_speech_rate(&vec![0.0f32; 300], 100, 10);
        assert!(rate.iter().all(|&r| r == 0.0));
    }

    #[test]
    fn test_edges_use_truncated_duration() {
        let rms = bursts(400, 20);
        let rate = estimate_speech_rate(&rms, 100, 10);
        // frame 0 sees [0, 50): 0.5 s window, ~2 peaks -> ~4 peaks/s
        assert!(rate[0] > 0.2 && rate[0] < 0.7, "edge rate {}", rate[0]);
    }

    #[test]
    fn test_short_input_not_smoothed() {
        let rms = vec![0.0, 1.0, 0.0, 0.5];
        let rate = estimate_speech_rate(&rms, 100, 10);
        // one peak at index 1 within a 0.04 s window -> 25 peaks/s -> 2.5 scaled
        assert!((rate[0] - 2.5).abs() < 1e-4);
    }
}
