//! Frame energy and the smoothing/statistics built on it
//!
//! Computes RMS energy per centered frame:
//! `E[n] = sqrt(mean(x[n*hop - frame_len/2 .. n*hop + frame_len/2]^2))`
//! on the zero-padded signal, without windowing.

use super::framing::{pad_center, Frames};

/// RMS energy per centered frame
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `frame_len` - Frame length in samples
/// * `hop` - Hop length in samples
///
/// # Returns
///
/// One RMS value per frame, `1 + (n + 2*(frame_len/2) - frame_len) / hop` values
pub fn rms_energy(samples: &[f32], frame_len: usize, hop: usize) -> Vec<f32> {
    if frame_len == 0 || hop == 0 {
        return Vec::new();
    }

    let padded = pad_center(samples, frame_len);
    let energies: Vec<f32> = Frames::new(&padded, frame_len, hop)
        .map(|frame| {
            let sum_sq: f32 = frame.iter().map(|&x| x * x).sum();
            (sum_sq / frame_len as f32).sqrt()
        })
        .collect();

    log::debug!(
        "RMS energy: {} frames (frame={}, hop={})",
        energies.len(),
        frame_len,
        hop
    );

    energies
}

/// Centered moving average with zero-padded edges
///
/// Output has the same length as the input; `out[i]` averages
/// `values[i - k/2 ..= i + (k-1)/2]` treating out-of-range values as zero, and
/// always divides by `kernel`. Inputs shorter than the kernel are returned unchanged.
pub fn moving_average(values: &[f32], kernel: usize) -> Vec<f32> {
    if kernel <= 1 || values.len() < kernel {
        return values.to_vec();
    }

    let n = values.len() as isize;
    let left = (kernel / 2) as isize;
    let right = ((kernel - 1) / 2) as isize;

    (0..n)
        .map(|i| {
            let lo = (i - left).max(0) as usize;
            let hi = (i + right).min(n - 1) as usize;
            values[lo..=hi].iter().sum::<f32>() / kernel as f32
        })
        .collect()
}

/// Median with the mean of the two middle values for even lengths; 0 for empty input
pub fn median(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_constant_signal() {
        let samples = vec![0.5f32; 16000];
        let rms = rms_energy(&samples, 400, 160);
        assert_eq!(rms.len(), 101);
        // interior frames see only signal
        assert!((rms[50] - 0.5).abs() < 1e-5);
        // first frame is half padding
        assert!((rms[0] - (0.125f32).sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_rms_silence() {
        let rms = rms_energy(&vec![0.0f32; 4000], 400, 160);
        assert!(rms.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn test_moving_average_same_mode() {
        let values = vec![5.0, 5.0, 5.0, 5.0, 5.0, 5.0];
        let smoothed = moving_average(&values, 5);
        assert_eq!(smoothed.len(), 6);
        assert!((smoothed[0] - 3.0).abs() < 1e-6);
        assert!((smoothed[1] - 4.0).abs() < 1e-6);
        assert!((smoothed[2] - 5.0).abs() < 1e-6);
        assert!((smoothed[5] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_moving_average_short_input_untouched() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(moving_average(&values, 5), values);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }
}
