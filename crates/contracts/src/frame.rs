//! Frame and MotionSequence - the unit of work of every pipeline stage.

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

use crate::{JointId, JointSample};

/// One timestamped pose sample.
///
/// `joints` is indexed by `JointId` and always holds one sample per joint of
/// the body model that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Frame counter, relative to the recording start after finalization
    pub serial: i32,
    /// Seconds, relative to the recording start after finalization
    pub timestamp: f64,
    pub joints: Vec<JointSample>,
}

impl Frame {
    pub fn new(serial: i32, timestamp: f64, joints: Vec<JointSample>) -> Self {
        Self {
            serial,
            timestamp,
            joints,
        }
    }

    #[inline]
    pub fn joint(&self, id: JointId) -> &JointSample {
        &self.joints[id.index()]
    }

    #[inline]
    pub fn joint_mut(&mut self, id: JointId) -> &mut JointSample {
        &mut self.joints[id.index()]
    }

    #[inline]
    pub fn position(&self, id: JointId) -> nalgebra::Vector3<f64> {
        self.joints[id.index()].position
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Short `Serial=… Timestamp=…` description for logs.
    pub fn info(&self) -> String {
        format!("Serial={:>4} Timestamp={:>10.6}", self.serial, self.timestamp)
    }
}

/// Ordered list of frames produced by one pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MotionSequence(Vec<Frame>);

impl MotionSequence {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Timestamp of the last frame, 0 when empty.
    pub fn duration(&self) -> f64 {
        self.0.last().map(|f| f.timestamp).unwrap_or(0.0)
    }

    /// Frame shown at `percent` (0-100) of a playback, clamped to the sequence.
    pub fn frame_at_progress(&self, percent: f64) -> Option<&Frame> {
        if self.0.is_empty() {
            return None;
        }
        let last = self.0.len() - 1;
        let fraction = if percent.is_finite() {
            (percent / 100.0).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let index = (fraction * last as f64).round() as usize;
        self.0.get(index.min(last))
    }

    /// Whether timestamps strictly increase.
    pub fn is_strictly_increasing(&self) -> bool {
        self.0
            .windows(2)
            .all(|pair| pair[1].timestamp > pair[0].timestamp)
    }

    pub fn into_inner(self) -> Vec<Frame> {
        self.0
    }
}

impl Deref for MotionSequence {
    type Target = Vec<Frame>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MotionSequence {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<Frame>> for MotionSequence {
    fn from(frames: Vec<Frame>) -> Self {
        Self(frames)
    }
}

impl FromIterator<Frame> for MotionSequence {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for MotionSequence {
    type Item = Frame;
    type IntoIter = std::vec::IntoIter<Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MotionSequence {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn frame(serial: i32, timestamp: f64) -> Frame {
        Frame::new(
            serial,
            timestamp,
            vec![JointSample::tracked(Vector3::new(serial as f64, 0.0, 0.0))],
        )
    }

    #[test]
    fn test_duration_and_progress() {
        let seq: MotionSequence = (0..5).map(|i| frame(i, i as f64 * 0.5)).collect();
        assert!((seq.duration() - 2.0).abs() < 1e-12);
        assert_eq!(seq.frame_at_progress(0.0).unwrap().serial, 0);
        assert_eq!(seq.frame_at_progress(50.0).unwrap().serial, 2);
        assert_eq!(seq.frame_at_progress(100.0).unwrap().serial, 4);
        assert_eq!(seq.frame_at_progress(250.0).unwrap().serial, 4);
        assert_eq!(seq.frame_at_progress(-10.0).unwrap().serial, 0);
    }

    #[test]
    fn test_empty_sequence() {
        let seq = MotionSequence::new();
        assert_eq!(seq.duration(), 0.0);
        assert!(seq.frame_at_progress(10.0).is_none());
        assert!(seq.is_strictly_increasing());
    }

    #[test]
    fn test_strictly_increasing() {
        let mut seq: MotionSequence = vec![frame(0, 0.0), frame(1, 0.1)].into();
        assert!(seq.is_strictly_increasing());
        seq.push(frame(2, 0.1));
        assert!(!seq.is_strictly_increasing());
    }

    #[test]
    fn test_frame_info() {
        assert!(frame(3, 0.25).info().contains("Serial=   3"));
    }
}
