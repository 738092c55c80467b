//! Label generation modules
//!
//! Turns time-stamped annotations into training targets:
//! - Label vocabulary and annotation records
//! - Frame labelling with interrupt dominance
//! - Windowing with majority vote

pub mod annotation;
pub mod frame_labeler;
pub mod windower;

use serde::{Deserialize, Serialize};

pub use annotation::{Annotation, AnnotationFile};
pub use frame_labeler::{frame_count, generate_frame_labels, time_to_frame};
pub use windower::{create_windows, majority_label, Window};

/// Number of label classes
pub const NUM_LABELS: usize = 4;

/// Per-frame turn-taking label
///
/// The discriminants are the class indices expected by the classifier, in the
/// fixed output order `[speaking, thinking_pause, turn_complete, interrupt_intent]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnLabel {
    /// Active speech
    Speaking = 0,
    /// Silence or hesitation within a turn; also the default for unannotated frames
    ThinkingPause = 1,
    /// End of a turn
    TurnComplete = 2,
    /// Overlapping speech from the other party
    InterruptIntent = 3,
}

impl TurnLabel {
    /// All labels in class-index order
    pub const ALL: [TurnLabel; NUM_LABELS] = [
        TurnLabel::Speaking,
        TurnLabel::ThinkingPause,
        TurnLabel::TurnComplete,
        TurnLabel::InterruptIntent,
    ];

    /// Class index
    pub fn index(self) -> usize {
        self as usize
    }

    /// Label for a class index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Annotation string for this label
    pub fn name(self) -> &'static str {
        match self {
            TurnLabel::Speaking => "speaking",
            TurnLabel::ThinkingPause => "thinking_pause",
            TurnLabel::TurnComplete => "turn_complete",
            TurnLabel::InterruptIntent => "interrupt_intent",
        }
    }

    /// Parse an annotation label string; unknown strings yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|l| l.name() == name)
    }
}

impl std::fmt::Display for TurnLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
