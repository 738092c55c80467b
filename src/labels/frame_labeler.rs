//! Frame labelling
//!
//! Converts continuous annotation intervals into one label per frame.
//!
//! Algorithm:
//! 1. Allocate `floor(duration * 1000 / frame_shift_ms)` frames, all `thinking_pause`
//! 2. Apply every non-interrupt annotation in input order (last writer wins)
//! 3. Force-apply every `interrupt_intent` annotation in input order
//!
//! Applying interrupts in a second pass gives them dominance over co-occurring
//! labels regardless of where they appear in the annotation list. Overlapping
//! interrupts are same-priority, so the later one wins.
//!
//! # Example
//!
//! ```
//! use turnprep::labels::{generate_frame_labels, Annotation, TurnLabel};
//!
//! let annotations = vec![
//!     Annotation::new(0.0, 0.5, TurnLabel::Speaking, "A"),
//!     Annotation::new(0.5, 1.0, TurnLabel::ThinkingPause, "A"),
//! ];
//! let labels = generate_frame_labels(&annotations, 1.0, 10);
//! assert_eq!(labels.len(), 100);
//! assert_eq!(labels[49], TurnLabel::Speaking);
//! assert_eq!(labels[50], TurnLabel::ThinkingPause);
//! ```

use super::{Annotation, TurnLabel};

/// Map a time in seconds to a (possibly negative) frame index
pub fn time_to_frame(time_sec: f64, frame_shift_ms: u32) -> i64 {
    (time_sec * 1000.0 / frame_shift_ms as f64).floor() as i64
}

/// Number of frames covering `duration_sec`
pub fn frame_count(duration_sec: f64, frame_shift_ms: u32) -> usize {
    if frame_shift_ms == 0 || !duration_sec.is_finite() || duration_sec <= 0.0 {
        return 0;
    }
    time_to_frame(duration_sec, frame_shift_ms).max(0) as usize
}

/// Clamp an annotation to `[0, total_frames)`; `None` if nothing remains
fn frame_range(annotation: &Annotation, total_frames: usize, frame_shift_ms: u32) -> Option<(usize, usize)> {
    let start = time_to_frame(annotation.start, frame_shift_ms).clamp(0, total_frames as i64) as usize;
    let end = time_to_frame(annotation.end, frame_shift_ms).clamp(0, total_frames as i64) as usize;
    if start < end {
        Some((start, end))
    } else {
        None
    }
}

/// Generate one label per frame from time-based annotations
///
/// # Arguments
///
/// * `annotations` - Annotations in application order
/// * `total_duration` - Recording duration in seconds
/// * `frame_shift_ms` - Shift between frames in milliseconds
///
/// # Returns
///
/// Label sequence of length `floor(total_duration * 1000 / frame_shift_ms)`.
/// Annotations with unrecognized labels are skipped.
pub fn generate_frame_labels(
    annotations: &[Annotation],
    total_duration: f64,
    frame_shift_ms: u32,
) -> Vec<TurnLabel> {
    let total_frames = frame_count(total_duration, frame_shift_ms);
    let mut labels = vec![TurnLabel::ThinkingPause; total_frames];

    let mut interrupts = Vec::new();
    let mut skipped = 0usize;

    for annotation in annotations {
        let Some(label) = annotation.turn_label() else {
            log::info!(
                "Skipping annotation with unrecognized label '{}' ({:.2}s-{:.2}s)",
                annotation.label,
                annotation.start,
                annotation.end
            );
            skipped += 1;
            continue;
        };

        let Some((start, end)) = frame_range(annotation, total_frames, frame_shift_ms) else {
            continue;
        };

        if label == TurnLabel::InterruptIntent {
            interrupts.push((start, end));
        } else {
            labels[start..end].fill(label);
        }
    }

    for (start, end) in interrupts {
        labels[start..end].fill(TurnLabel::InterruptIntent);
    }

    log::debug!(
        "Generated {} frame labels from {} annotations ({} skipped)",
        total_frames,
        annotations.len(),
        skipped
    );

    labels
}

/// Class indices for a label sequence, in the archive's integer dtype
pub fn label_indices(labels: &[TurnLabel]) -> Vec<i64> {
    labels.iter().map(|l| l.index() as i64).collect()
}
