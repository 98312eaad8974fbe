//! Processed motion containers shared by the pipeline, the sinks and the CLI.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::MotionSequence;

/// Processing stage a sequence belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionStage {
    Raw,
    Interpolated,
    Filtered,
    Adjusted,
}

impl MotionStage {
    /// Stages in store order.
    pub const ALL: [MotionStage; 4] = [
        Self::Raw,
        Self::Interpolated,
        Self::Filtered,
        Self::Adjusted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Interpolated => "interpolated",
            Self::Filtered => "filtered",
            Self::Adjusted => "adjusted",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Raw => "Raw",
            Self::Interpolated => "Interpolated",
            Self::Filtered => "Filtered",
            Self::Adjusted => "Adjusted",
        }
    }
}

impl fmt::Display for MotionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Person a recording belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    #[default]
    Athlete,
    Trainer,
}

impl Subject {
    /// Subjects in store order.
    pub const ALL: [Subject; 2] = [Self::Athlete, Self::Trainer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Athlete => "athlete",
            Self::Trainer => "trainer",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Athlete => "Athlete",
            Self::Trainer => "Trainer",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every stage of one subject's latest recording.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectMotions {
    pub raw: MotionSequence,
    pub interpolated: MotionSequence,
    pub filtered: MotionSequence,
    pub adjusted: MotionSequence,
}

impl SubjectMotions {
    pub fn stage(&self, stage: MotionStage) -> &MotionSequence {
        match stage {
            MotionStage::Raw => &self.raw,
            MotionStage::Interpolated => &self.interpolated,
            MotionStage::Filtered => &self.filtered,
            MotionStage::Adjusted => &self.adjusted,
        }
    }

    pub fn stage_mut(&mut self, stage: MotionStage) -> &mut MotionSequence {
        match stage {
            MotionStage::Raw => &mut self.raw,
            MotionStage::Interpolated => &mut self.interpolated,
            MotionStage::Filtered => &mut self.filtered,
            MotionStage::Adjusted => &mut self.adjusted,
        }
    }

    /// True when no stage holds any frame.
    pub fn is_empty(&self) -> bool {
        MotionStage::ALL.iter().all(|s| self.stage(*s).is_empty())
    }
}

/// Motions of both subjects, as persisted in the binary store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionArchive {
    pub athlete: SubjectMotions,
    pub trainer: SubjectMotions,
}

impl MotionArchive {
    pub fn subject(&self, subject: Subject) -> &SubjectMotions {
        match subject {
            Subject::Athlete => &self.athlete,
            Subject::Trainer => &self.trainer,
        }
    }

    pub fn subject_mut(&mut self, subject: Subject) -> &mut SubjectMotions {
        match subject {
            Subject::Athlete => &mut self.athlete,
            Subject::Trainer => &mut self.trainer,
        }
    }

    /// Length of the longer raw recording of the two subjects.
    pub fn longest_raw_len(&self) -> usize {
        self.athlete.raw.len().max(self.trainer.raw.len())
    }

    /// Length of the longest sequence of `stage` across subjects.
    pub fn longest_len(&self, stage: MotionStage) -> usize {
        Subject::ALL
            .iter()
            .map(|s| self.subject(*s).stage(stage).len())
            .max()
            .unwrap_or(0)
    }
}

/// Length statistics of one limb over a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimbStats {
    /// `Start->End`
    pub name: String,
    pub min_length: f64,
    pub max_length: f64,
    pub average_length: f64,
    /// Mean of this limb's and its sibling's average
    pub desired_length: f64,
    pub serial_min: i32,
    pub serial_max: i32,
}

impl LimbStats {
    /// Spread between longest and shortest observation.
    pub fn gap(&self) -> f64 {
        self.max_length - self.min_length
    }
}

/// Length statistics of every limb, in limb table order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LimbReport {
    pub limbs: Vec<LimbStats>,
    /// Sum of gaps divided by `limbs - 1`
    pub gap_average: f64,
}

impl LimbReport {
    pub fn desired_lengths(&self) -> Vec<f64> {
        self.limbs.iter().map(|l| l.desired_length).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.limbs.is_empty()
    }
}

/// Reference offsets of a processed recording, taken from its first adjusted frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseOffsets {
    /// Pelvis position
    pub pelvis: Vector3<f64>,
    /// Mean ankle height relative to the pelvis
    pub feet: f64,
}

/// Summary of one pipeline run, consumed by metrics and the CLI.
#[derive(Debug, Clone, Default)]
pub struct ProcessingMeta {
    pub subject: Subject,
    /// Frames per stage after cropping
    pub stage_sizes: BTreeMap<MotionStage, usize>,
    /// Anomaly kind -> occurrences
    pub anomalies: BTreeMap<String, u64>,
    pub gap_average_before: f64,
    pub gap_average_after: f64,
    /// Recording duration in seconds
    pub duration_s: f64,
    /// Wall time spent in the pipeline
    pub elapsed_ms: f64,
}

impl ProcessingMeta {
    pub fn anomaly_total(&self) -> u64 {
        self.anomalies.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Frame, JointSample};

    #[test]
    fn test_archive_accessors() {
        let mut archive = MotionArchive::default();
        archive
            .subject_mut(Subject::Trainer)
            .stage_mut(MotionStage::Raw)
            .push(Frame::new(0, 0.0, vec![JointSample::default()]));

        assert_eq!(archive.trainer.raw.len(), 1);
        assert!(archive.athlete.is_empty());
        assert!(!archive.trainer.is_empty());
        assert_eq!(archive.longest_raw_len(), 1);
        assert_eq!(archive.longest_len(MotionStage::Adjusted), 0);
    }

    #[test]
    fn test_limb_gap() {
        let stats = LimbStats {
            name: "A->B".into(),
            min_length: 0.8,
            max_length: 1.2,
            average_length: 1.0,
            desired_length: 1.0,
            serial_min: 2,
            serial_max: 1,
        };
        assert!((stats.gap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_stage_and_subject_order() {
        assert_eq!(MotionStage::ALL[0], MotionStage::Raw);
        assert_eq!(MotionStage::ALL[3], MotionStage::Adjusted);
        assert_eq!(Subject::ALL, [Subject::Athlete, Subject::Trainer]);
        assert_eq!(Subject::Trainer.to_string(), "trainer");
    }
}
