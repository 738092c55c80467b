//! Fixed-length windowing with majority-vote labels

use serde::{Deserialize, Serialize};

use super::{TurnLabel, NUM_LABELS};

/// Slice of a frame label sequence with a single training label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// First frame (inclusive)
    pub start_frame: usize,

    /// Last frame (exclusive)
    pub end_frame: usize,

    /// Most frequent label in `[start_frame, end_frame)`
    pub majority_label: TurnLabel,
}

impl Window {
    /// Number of frames covered
    pub fn len(&self) -> usize {
        self.end_frame - self.start_frame
    }

    /// True for a zero-length window
    pub fn is_empty(&self) -> bool {
        self.end_frame == self.start_frame
    }
}

/// Most frequent label in a slice; ties go to the lowest class index
pub fn majority_label(labels: &[TurnLabel]) -> TurnLabel {
    let mut counts = [0usize; NUM_LABELS];
    for label in labels {
        counts[label.index()] += 1;
    }

    // First maximum over class indices 0..NUM_LABELS
    let mut best = 0;
    for (index, &count) in counts.iter().enumerate().skip(1) {
        if count > counts[best] {
            best = index;
        }
    }
    TurnLabel::ALL[best]
}

/// Slice frame labels into fixed-size windows
///
/// # Arguments
///
/// * `labels` - Per-frame labels
/// * `context_frames` - Window width in frames
/// * `hop_frames` - Advance between window starts in frames
///
/// # Returns
///
/// Windows starting at 0, `hop_frames`, ... while `start + context_frames <= labels.len()`.
/// A trailing partial window is dropped; a sequence shorter than
/// `context_frames` yields no windows.
pub fn create_windows(labels: &[TurnLabel], context_frames: usize, hop_frames: usize) -> Vec<Window> {
    let n_frames = labels.len();
    if context_frames == 0 || hop_frames == 0 || n_frames < context_frames {
        log::debug!(
            "No windows: {} frames, context={}, hop={}",
            n_frames,
            context_frames,
            hop_frames
        );
        return Vec::new();
    }

    let windows: Vec<Window> = (0..=n_frames - context_frames)
        .step_by(hop_frames)
        .map(|start| {
            let end = start + context_frames;
            Window {
                start_frame: start,
                end_frame: end,
                majority_label: majority_label(&labels[start..end]),
            }
        })
        .collect();

    log::debug!(
        "Created {} windows from {} frames (context={}, hop={})",
        windows.len(),
        n_frames,
        context_frames,
        hop_frames
    );

    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    use TurnLabel::*;

    #[test]
    fn test_shorter_than_context_yields_nothing() {
        let labels = vec![Speaking; 99];
        assert!(create_windows(&labels, 100, 10).is_empty());
        assert!(create_windows(&[], 100, 10).is_empty());
    }

    #[test]
    fn test_exact_context_yields_one_window() {
        let labels = vec![TurnComplete; 100];
        let windows = create_windows(&labels, 100, 10);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start_frame, 0);
        assert_eq!(windows[0].end_frame, 100);
        assert_eq!(windows[0].majority_label, TurnComplete);
    }

    #[test]
    fn test_tail_dropped() {
        let labels = vec![Speaking; 135];
        let windows = create_windows(&labels, 100, 10);
        // starts 0, 10, 20, 30
        assert_eq!(windows.len(), 4);
        assert_eq!(windows.last().unwrap().start_frame, 30);
        assert!(windows.iter().all(|w| w.len() == 100));
    }

    #[test]
    fn test_tie_resolves_to_lowest_index() {
        let mut labels = vec![Speaking; 5];
        labels.extend(vec![ThinkingPause; 5]);
        assert_eq!(majority_label(&labels), Speaking);

        let mut labels = vec![InterruptIntent; 3];
        labels.extend(vec![TurnComplete; 3]);
        labels.extend(vec![Speaking; 2]);
        assert_eq!(majority_label(&labels), TurnComplete);
    }

    #[test]
    fn test_majority_per_window() {
        let mut labels = vec![Speaking; 60];
        labels.extend(vec![InterruptIntent; 60]);
        let windows = create_windows(&labels, 40, 20);
        let majorities: Vec<TurnLabel> = windows.iter().map(|w| w.majority_label).collect();
        // windows: [0,40) [20,60) [40,80) [60,100) [80,120)
        assert_eq!(
            majorities,
            vec![Speaking, Speaking, Speaking, InterruptIntent, InterruptIntent]
        );
    }
}
