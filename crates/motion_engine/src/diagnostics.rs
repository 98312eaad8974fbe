//! Numeric anomalies collected while processing a take.
//!
//! Every anomaly is logged and counted the moment it is reported; processing
//! carries on with the documented fallback.

use std::collections::BTreeMap;
use std::fmt;

use contracts::JointId;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum Anomaly {
    /// Fewer than two raw frames; nothing to interpolate
    InsufficientFrames { frames: usize },
    /// Raw timestamp not greater than its predecessor
    NonIncreasingTimestamp { index: usize, timestamp: f64 },
    /// Bracketing samples share a timestamp; previous sample held
    ZeroInterval { target: usize, timestamp: f64 },
    /// Limb too short to rescale; left as is
    DegenerateLimb { serial: i32, limb: String, length: f64 },
    /// Forward axis vanished; identity orientation used
    DegenerateOrientation { serial: i32, joint: JointId },
    /// Lead-in padded with a held pose
    PreRollPadded { takes: u64 },
}

impl Anomaly {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientFrames { .. } => "insufficient_frames",
            Self::NonIncreasingTimestamp { .. } => "non_increasing_timestamp",
            Self::ZeroInterval { .. } => "zero_interval",
            Self::DegenerateLimb { .. } => "degenerate_limb",
            Self::DegenerateOrientation { .. } => "degenerate_orientation",
            Self::PreRollPadded { .. } => "pre_roll_padded",
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientFrames { frames } => {
                write!(f, "only {frames} raw frame(s), need at least 2")
            }
            Self::NonIncreasingTimestamp { index, timestamp } => {
                write!(f, "raw frame {index} has non-increasing timestamp {timestamp:.6}")
            }
            Self::ZeroInterval { target, timestamp } => {
                write!(f, "zero interval around target {target} (t={timestamp:.6})")
            }
            Self::DegenerateLimb {
                serial,
                limb,
                length,
            } => write!(f, "limb {limb} degenerate in frame {serial} (length {length:e})"),
            Self::DegenerateOrientation { serial, joint } => {
                write!(f, "joint {joint} has no forward axis in frame {serial}")
            }
            Self::PreRollPadded { takes } => {
                write!(f, "lead-in padded with held pose ({takes} take(s) so far)")
            }
        }
    }
}

/// Anomaly sink threaded through the pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    anomalies: Vec<Anomaly>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, anomaly: Anomaly) {
        warn!(kind = anomaly.kind(), "{}", anomaly);
        observability::record_anomaly(anomaly.kind());
        self.anomalies.push(anomaly);
    }

    pub fn len(&self) -> usize {
        self.anomalies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Anomaly> {
        self.anomalies.iter()
    }

    /// Occurrences of one kind.
    pub fn count(&self, kind: &str) -> usize {
        self.anomalies.iter().filter(|a| a.kind() == kind).count()
    }

    /// Kind -> occurrences.
    pub fn counts(&self) -> BTreeMap<String, u64> {
        let mut counts = BTreeMap::new();
        for anomaly in &self.anomalies {
            *counts.entry(anomaly.kind().to_string()).or_insert(0) += 1;
        }
        counts
    }
}
