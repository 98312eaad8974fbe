//! PoseSource trait - body tracker abstraction
//!
//! Decouples the capture session from whatever produces decoded skeletons
//! (a sensor driver binding, a replay file, the mock generator).

use std::sync::Arc;

use crate::JointSample;

/// One decoded skeleton as delivered by a body tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSample {
    /// One sample per joint, in joint id order
    pub joints: Vec<JointSample>,
    /// Seconds on the tracker's clock
    pub timestamp: f64,
}

impl PoseSample {
    pub fn new(joints: Vec<JointSample>, timestamp: f64) -> Self {
        Self { joints, timestamp }
    }
}

/// Pose callback type
///
/// Invoked from the source's own thread for every tracked skeleton.
pub type PoseCallback = Arc<dyn Fn(PoseSample) + Send + Sync>;

/// Body tracker data source.
///
/// Sources push samples through a callback, mirroring how tracker SDKs
/// deliver frames.
pub trait PoseSource: Send + Sync {
    /// Source identifier (used for logging/metrics)
    fn source_id(&self) -> &str;

    /// Joints per sample
    fn joint_count(&self) -> usize;

    /// Register the sample callback and start producing.
    ///
    /// Calling again while listening must not register a second callback.
    fn listen(&self, callback: PoseCallback);

    /// Stop producing samples
    fn stop(&self);

    fn is_listening(&self) -> bool;
}
