//! Peak detection for 1D envelopes
//!
//! Finds local maxima that clear a height threshold and are separated by a
//! minimum distance. The rules are chosen so a second runtime can reproduce
//! the exact same peak set:
//!
//! 1. A peak needs a strictly lower left neighbor and a strictly lower value
//!    after any flat run; flat tops resolve to the run's midpoint (rounded down)
//! 2. The first and last samples are never peaks
//! 3. Peaks below `min_height` are dropped (`>=` passes)
//! 4. Starting from the highest peak, neighbors closer than `min_distance`
//!    are removed; equal heights are resolved in favor of the later peak

/// Find peak indices in a signal
///
/// # Arguments
///
/// * `signal` - Signal to search
/// * `min_height` - Minimum peak value (absolute)
/// * `min_distance` - Minimum index distance between kept peaks (`<= 1` disables)
///
/// # Returns
///
/// Peak indices in ascending order
///
/// # Example
///
/// ```
/// use turnprep::features::peak_picking::find_peaks;
///
/// let signal = vec![0.0, 0.5, 1.0, 0.7, 0.3, 0.9, 0.2];
/// assert_eq!(find_peaks(&signal, 0.5, 1), vec![2, 5]);
/// assert_eq!(find_peaks(&signal, 0.5, 4), vec![2]);
/// ```
pub fn find_peaks(signal: &[f32], min_height: f32, min_distance: usize) -> Vec<usize> {
    if signal.len() < 3 {
        return Vec::new();
    }

    // Step 1: local maxima with plateau handling
    let mut peaks = Vec::new();
    let last = signal.len() - 1;
    let mut i = 1;
    while i < last {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < last && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                let right_edge = ahead - 1;
                peaks.push((i + right_edge) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }

    // Step 2: height threshold
    peaks.retain(|&p| signal[p] >= min_height);

    // Step 3: distance suppression, highest first
    if min_distance > 1 && peaks.len() > 1 {
        let mut keep = vec![true; peaks.len()];

        // Stable ascending sort; iterating in reverse visits the later of equal peaks first
        let mut order: Vec<usize> = (0..peaks.len()).collect();
        order.sort_by(|&a, &b| {
            signal[peaks[a]]
                .partial_cmp(&signal[peaks[b]])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for &j in order.iter().rev() {
            if !keep[j] {
                continue;
            }
            let mut k = j;
            while k > 0 && peaks[j] - peaks[k - 1] < min_distance {
                keep[k - 1] = false;
                k -= 1;
            }
            let mut k = j + 1;
            while k < peaks.len() && peaks[k] - peaks[j] < min_distance {
                keep[k] = false;
                k += 1;
            }
        }

        peaks = peaks
            .into_iter()
            .zip(keep)
            .filter_map(|(p, kept)| kept.then_some(p))
            .collect();
    }

    peaks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_peaks() {
        let signal = vec![0.0, 1.0, 0.0, 2.0, 0.0, 3.0, 0.0];
        assert_eq!(find_peaks(&signal, 0.0, 1), vec![1, 3, 5]);
        assert_eq!(find_peaks(&signal, 1.5, 1), vec![3, 5]);
    }

    #[test]
    fn test_edges_never_peaks() {
        let signal = vec![5.0, 1.0, 2.0, 1.0, 5.0];
        assert_eq!(find_peaks(&signal, 0.0, 1), vec![2]);
    }

    #[test]
    fn test_plateau_midpoint() {
        let signal = vec![0.0, 1.0, 1.0, 1.0, 1.0, 0.0];
        assert_eq!(find_peaks(&signal, 0.0, 1), vec![2]);
        // plateau running into the last sample is not a peak
        let signal = vec![0.0, 1.0, 1.0, 1.0];
        assert!(find_peaks(&signal, 0.0, 1).is_empty());
    }

    #[test]
    fn test_min_distance_keeps_highest() {
        let signal = vec![0.0, 1.0, 0.0, 3.0, 0.0, 2.0, 0.0, 0.0, 1.5, 0.0];
        // peaks at 1, 3, 5, 8; distance 3 removes 1 and 5 around 3
        assert_eq!(find_peaks(&signal, 0.0, 3), vec![3, 8]);
    }

    #[test]
    fn test_min_distance_tie_prefers_later() {
        let signal = vec![0.0, 1.0, 0.0, 1.0, 0.0];
        assert_eq!(find_peaks(&signal, 0.0, 3), vec![3]);
    }

    #[test]
    fn test_short_and_flat() {
        assert!(find_peaks(&[], 0.0, 3).is_empty());
        assert!(find_peaks(&[1.0, 2.0], 0.0, 3).is_empty());
        assert!(find_peaks(&[1.0; 10], 0.0, 3).is_empty());
    }
}
