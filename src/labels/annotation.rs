//! Annotation records and per-recording annotation files

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::TurnLabel;
use crate::error::PipelineError;

/// Time-stamped event annotation
///
/// `label` keeps the raw string so that unrecognized kinds survive parsing and
/// are dropped by the frame labeler instead of failing the whole file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Start time in seconds
    pub start: f64,

    /// End time in seconds (>= start)
    pub end: f64,

    /// Event kind (`speaking`, `thinking_pause`, `turn_complete`, `interrupt_intent`)
    pub label: String,

    /// Speaker identifier
    #[serde(default)]
    pub speaker: String,
}

impl Annotation {
    /// Build an annotation from a known label
    pub fn new(start: f64, end: f64, label: TurnLabel, speaker: &str) -> Self {
        Self {
            start,
            end,
            label: label.name().to_string(),
            speaker: speaker.to_string(),
        }
    }

    /// Parsed label, or `None` for an unrecognized kind
    pub fn turn_label(&self) -> Option<TurnLabel> {
        TurnLabel::parse(&self.label)
    }
}

/// Annotation file for one recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationFile {
    /// Recording identifier
    #[serde(default)]
    pub id: Option<String>,

    /// Recording duration in seconds (0 when not recorded)
    #[serde(default)]
    pub duration: f64,

    /// Sample rate of the source audio in Hz (0 when not recorded)
    #[serde(default)]
    pub sample_rate: u32,

    /// Speaker label to corpus speaker id
    #[serde(default)]
    pub speakers: BTreeMap<String, String>,

    /// Annotations in application order
    pub annotations: Vec<Annotation>,
}

impl AnnotationFile {
    /// Read an annotation file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let file: AnnotationFile = serde_json::from_str(&text)?;
        log::debug!(
            "Loaded {} annotations from {} ({:.2}s)",
            file.annotations.len(),
            path.display(),
            file.duration
        );
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_annotation_file() {
        let json = r#"{
            "id": "conv_0000",
            "duration": 12.5,
            "sample_rate": 16000,
            "speakers": {"A": "1089", "B": "121"},
            "annotations": [
                {"start": 0.0, "end": 2.1, "label": "speaking", "speaker": "A"},
                {"start": 2.1, "end": 2.6, "label": "turn_complete", "speaker": "A"},
                {"start": 2.6, "end": 3.0, "label": "backchannel", "speaker": "B"}
            ]
        }"#;
        let file: AnnotationFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.id.as_deref(), Some("conv_0000"));
        assert_eq!(file.annotations.len(), 3);
        assert_eq!(file.annotations[1].turn_label(), Some(TurnLabel::TurnComplete));
        assert_eq!(file.annotations[2].turn_label(), None);
        assert_eq!(file.speakers.get("B").map(String::as_str), Some("121"));
    }

    #[test]
    fn test_speaker_optional() {
        let json = r#"{"duration": 1.0, "sample_rate": 16000,
                       "annotations": [{"start": 0.0, "end": 1.0, "label": "speaking"}]}"#;
        let file: AnnotationFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.annotations[0].speaker, "");
    }

    #[test]
    fn test_only_annotations_required() {
        let json = r#"{"annotations": [{"start": 0.5, "end": 1.0, "label": "interrupt_intent"}]}"#;
        let file: AnnotationFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.duration, 0.0);
        assert_eq!(file.sample_rate, 0);
        assert_eq!(file.annotations[0].turn_label(), Some(TurnLabel::InterruptIntent));
    }
}
