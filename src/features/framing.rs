//! Centered framing shared by every per-frame estimator
//!
//! Each estimator pads the signal with `frame_len / 2` zeros on both sides and
//! slides a `frame_len` window by `hop` samples, so frame `i` is centered on
//! sample `i * hop`. Estimators using a different `frame_len` may end up with
//! a different frame count; the extractor reconciles them to the minimum.

/// Zero-pad `samples` by `frame_len / 2` on both sides
pub fn pad_center(samples: &[f32], frame_len: usize) -> Vec<f32> {
    let pad = frame_len / 2;
    let mut padded = vec![0.0f32; samples.len() + 2 * pad];
    padded[pad..pad + samples.len()].copy_from_slice(samples);
    padded
}

/// Number of centered frames for a signal of `n_samples`
pub fn centered_frame_count(n_samples: usize, frame_len: usize, hop: usize) -> usize {
    if hop == 0 || frame_len == 0 {
        return 0;
    }
    let padded_len = n_samples + 2 * (frame_len / 2);
    if padded_len < frame_len {
        0
    } else {
        1 + (padded_len - frame_len) / hop
    }
}

/// Iterator over the frames of an already padded signal
#[derive(Debug)]
pub struct Frames<'a> {
    padded: &'a [f32],
    frame_len: usize,
    hop: usize,
    position: usize,
}

impl<'a> Frames<'a> {
    /// Frame a padded signal
    pub fn new(padded: &'a [f32], frame_len: usize, hop: usize) -> Self {
        Self {
            padded,
            frame_len,
            hop,
            position: 0,
        }
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a [f32];

    fn next(&mut self) -> Option<Self::Item> {
        if self.hop == 0 || self.frame_len == 0 || self.position + self.frame_len > self.padded.len() {
            return None;
        }
        let frame = &self.padded[self.position..self.position + self.frame_len];
        self.position += self.hop;
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_frame_count() {
        // 1 s at 16 kHz, 25 ms / 10 ms
        assert_eq!(centered_frame_count(16000, 400, 160), 101);
        assert_eq!(centered_frame_count(16159, 400, 160), 101);
        assert_eq!(centered_frame_count(16160, 400, 160), 102);
        // odd frame length loses one sample of padding
        assert_eq!(centered_frame_count(16000, 401, 160), 100);
        assert_eq!(centered_frame_count(100, 400, 0), 0);
    }

    #[test]
    fn test_frames_match_count() {
        let samples: Vec<f32> = (0..1000).map(|i| i as f32).collect();
        let padded = pad_center(&samples, 64);
        let frames: Vec<&[f32]> = Frames::new(&padded, 64, 16).collect();
        assert_eq!(frames.len(), centered_frame_count(samples.len(), 64, 16));
        // frame i is centered on sample i * hop
        assert_eq!(frames[0][32], 0.0);
        assert_eq!(frames[3][32], 48.0);
        assert!(frames.iter().all(|f| f.len() == 64));
    }

    #[test]
    fn test_pad_center() {
        let padded = pad_center(&[1.0, 2.0], 4);
        assert_eq!(padded, vec![0.0, 0.0, 1.0, 2.0, 0.0, 0.0]);
    }
}
