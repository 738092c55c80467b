//! Window assembly
//!
//! Gathers the frame ranges of each [`Window`] out of a recording's feature
//! matrix into a `(windows, context, 17)` tensor. Windows reaching past the
//! end of the matrix (possible after frame-count reconciliation) are
//! zero-padded at the tail.

use ndarray::{s, Array1, Array3, ArrayView2};

use super::FEATURE_DIM;
use crate::error::PipelineError;
use crate::labels::Window;

/// Windowed features with one label per window
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExamples {
    /// `(n_windows, context_frames, 17)`
    pub features: Array3<f32>,

    /// Majority label index per window
    pub labels: Array1<i64>,
}

impl TrainingExamples {
    /// Pair assembled features with the windows' majority labels
    pub fn from_windows(features: ArrayView2<'_, f32>, windows: &[Window]) -> Result<Self, PipelineError> {
        let tensor = assemble_windows(features, windows)?;
        let labels = windows
            .iter()
            .map(|w| w.majority_label.index() as i64)
            .collect::<Array1<i64>>();
        Ok(Self {
            features: tensor,
            labels,
        })
    }

    /// Number of windows
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when no window was produced
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Stack the windows' feature rows
///
/// # Arguments
///
/// * `features` - `(n_frames, 17)` matrix of one recording
/// * `windows` - Windows of equal length over that recording
///
/// # Returns
///
/// `(windows.len(), context, 17)`; `(0, 0, 17)` when there are no windows
///
/// # Errors
///
/// `InvalidInput` if the matrix is not 17 columns wide or windows differ in length
pub fn assemble_windows(features: ArrayView2<'_, f32>, windows: &[Window]) -> Result<Array3<f32>, PipelineError> {
    if features.ncols() != FEATURE_DIM {
        return Err(PipelineError::InvalidInput(format!(
            "Feature matrix has {} columns, expected {}",
            features.ncols(),
            FEATURE_DIM
        )));
    }

    let Some(first) = windows.first() else {
        return Ok(Array3::zeros((0, 0, FEATURE_DIM)));
    };
    let context = first.len();
    if let Some(bad) = windows.iter().find(|w| w.len() != context) {
        return Err(PipelineError::InvalidInput(format!(
            "Window [{}, {}) has length {}, expected {}",
            bad.start_frame,
            bad.end_frame,
            bad.len(),
            context
        )));
    }

    let n_frames = features.nrows();
    let mut out = Array3::<f32>::zeros((windows.len(), context, FEATURE_DIM));
    let mut padded = 0usize;

    for (i, window) in windows.iter().enumerate() {
        let end = window.end_frame.min(n_frames);
        if window.start_frame >= end {
            padded += 1;
            continue;
        }
        let available = end - window.start_frame;
        if available < context {
            padded += 1;
        }
        out.slice_mut(s![i, ..available, ..])
            .assign(&features.slice(s![window.start_frame..end, ..]));
    }

    if padded > 0 {
        log::debug!(
            "{} of {} windows zero-padded ({} feature frames available)",
            padded,
            windows.len(),
            n_frames
        );
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::TurnLabel;
    use ndarray::Array2;

    fn ramp(n_frames: usize) -> Array2<f32> {
        Array2::from_shape_fn((n_frames, FEATURE_DIM), |(r, c)| (r * 100 + c) as f32)
    }

    fn window(start: usize, end: usize, label: TurnLabel) -> Window {
        Window {
            start_frame: start,
            end_frame: end,
            majority_label: label,
        }
    }

    #[test]
    fn test_copies_rows() {
        let features = ramp(30);
        let windows = vec![window(0, 10, TurnLabel::Speaking), window(5, 15, TurnLabel::TurnComplete)];
        let out = assemble_windows(features.view(), &windows).unwrap();
        assert_eq!(out.shape(), &[2, 10, FEATURE_DIM]);
        assert_eq!(out[[0, 0, 0]], 0.0);
        assert_eq!(out[[1, 0, 3]], 503.0);
        assert_eq!(out[[1, 9, 16]], 1416.0);
    }

    #[test]
    fn test_short_matrix_zero_pads_tail() {
        let features = ramp(12);
        let windows = vec![window(5, 15, TurnLabel::Speaking), window(20, 30, TurnLabel::Speaking)];
        let out = assemble_windows(features.view(), &windows).unwrap();
        // rows 5..12 copied, 12..15 zero
        assert_eq!(out[[0, 6, 1]], 1101.0);
        assert!(out.slice(s![0, 7.., ..]).iter().all(|&x| x == 0.0));
        // window entirely past the end is all zeros
        assert!(out.slice(s![1, .., ..]).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_no_windows() {
        let out = assemble_windows(ramp(50).view(), &[]).unwrap();
        assert_eq!(out.shape(), &[0, 0, FEATURE_DIM]);
    }

    #[test]
    fn test_inconsistent_lengths_rejected() {
        let windows = vec![window(0, 10, TurnLabel::Speaking), window(0, 11, TurnLabel::Speaking)];
        assert!(assemble_windows(ramp(20).view(), &windows).is_err());
    }

    #[test]
    fn test_wrong_width_rejected() {
        let features = Array2::<f32>::zeros((20, 13));
        assert!(assemble_windows(features.view(), &[window(0, 10, TurnLabel::Speaking)]).is_err());
    }

    #[test]
    fn test_labels_follow_windows() {
        let windows = vec![
            window(0, 10, TurnLabel::InterruptIntent),
            window(10, 20, TurnLabel::ThinkingPause),
        ];
        let examples = TrainingExamples::from_windows(ramp(20).view(), &windows).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples.labels.to_vec(), vec![3, 1]);
    }
}
