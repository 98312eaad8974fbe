//! Joint identifiers and per-joint samples.
//!
//! A body model owns a fixed joint set; every frame stores one `JointSample`
//! per joint, indexed by `JointId`.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a joint inside a body model.
///
/// Cheap to copy; doubles as the index into `Frame::joints`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointId(pub u16);

impl JointId {
    /// Create a joint id from a table index.
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Position of this joint in per-frame arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u16> for JointId {
    #[inline]
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Joints reported by the Kinect v2 body tracker, in sensor order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum KinectJoint {
    SpineBase = 0,
    SpineMid = 1,
    Neck = 2,
    Head = 3,
    ShoulderLeft = 4,
    ElbowLeft = 5,
    WristLeft = 6,
    HandLeft = 7,
    ShoulderRight = 8,
    ElbowRight = 9,
    WristRight = 10,
    HandRight = 11,
    HipLeft = 12,
    KneeLeft = 13,
    AnkleLeft = 14,
    FootLeft = 15,
    HipRight = 16,
    KneeRight = 17,
    AnkleRight = 18,
    FootRight = 19,
    SpineShoulder = 20,
    HandTipLeft = 21,
    ThumbLeft = 22,
    HandTipRight = 23,
    ThumbRight = 24,
}

impl KinectJoint {
    /// Number of joints tracked by the sensor.
    pub const COUNT: usize = 25;

    /// All joints in id order.
    pub const ALL: [KinectJoint; Self::COUNT] = [
        Self::SpineBase,
        Self::SpineMid,
        Self::Neck,
        Self::Head,
        Self::ShoulderLeft,
        Self::ElbowLeft,
        Self::WristLeft,
        Self::HandLeft,
        Self::ShoulderRight,
        Self::ElbowRight,
        Self::WristRight,
        Self::HandRight,
        Self::HipLeft,
        Self::KneeLeft,
        Self::AnkleLeft,
        Self::FootLeft,
        Self::HipRight,
        Self::KneeRight,
        Self::AnkleRight,
        Self::FootRight,
        Self::SpineShoulder,
        Self::HandTipLeft,
        Self::ThumbLeft,
        Self::HandTipRight,
        Self::ThumbRight,
    ];

    /// Joint id of this sensor joint.
    #[inline]
    pub const fn id(self) -> JointId {
        JointId(self as u16)
    }

    /// Display name, as used in reports and marker exports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::SpineBase => "SpineBase",
            Self::SpineMid => "SpineMid",
            Self::Neck => "Neck",
            Self::Head => "Head",
            Self::ShoulderLeft => "ShoulderLeft",
            Self::ElbowLeft => "ElbowLeft",
            Self::WristLeft => "WristLeft",
            Self::HandLeft => "HandLeft",
            Self::ShoulderRight => "ShoulderRight",
            Self::ElbowRight => "ElbowRight",
            Self::WristRight => "WristRight",
            Self::HandRight => "HandRight",
            Self::HipLeft => "HipLeft",
            Self::KneeLeft => "KneeLeft",
            Self::AnkleLeft => "AnkleLeft",
            Self::FootLeft => "FootLeft",
            Self::HipRight => "HipRight",
            Self::KneeRight => "KneeRight",
            Self::AnkleRight => "AnkleRight",
            Self::FootRight => "FootRight",
            Self::SpineShoulder => "SpineShoulder",
            Self::HandTipLeft => "HandTipLeft",
            Self::ThumbLeft => "ThumbLeft",
            Self::HandTipRight => "HandTipRight",
            Self::ThumbRight => "ThumbRight",
        }
    }

    /// Look a sensor joint up by id.
    pub fn from_id(id: JointId) -> Option<Self> {
        Self::ALL.get(id.index()).copied()
    }
}

impl From<KinectJoint> for JointId {
    #[inline]
    fn from(joint: KinectJoint) -> Self {
        joint.id()
    }
}

/// Tracking confidence reported for a joint.
///
/// Variant order matches the sensor's numbering and is the on-disk encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    #[default]
    NotTracked,
    Inferred,
    Tracked,
}

/// One joint of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "JointRecord", into = "JointRecord")]
pub struct JointSample {
    /// Camera-space position in meters (y up)
    pub position: Vector3<f64>,
    /// Absolute orientation
    pub orientation: UnitQuaternion<f64>,
    pub tracking_state: TrackingState,
}

impl JointSample {
    pub fn new(
        position: Vector3<f64>,
        orientation: UnitQuaternion<f64>,
        tracking_state: TrackingState,
    ) -> Self {
        Self {
            position,
            orientation,
            tracking_state,
        }
    }

    /// Tracked sample at `position` with identity orientation.
    pub fn tracked(position: Vector3<f64>) -> Self {
        Self::new(position, UnitQuaternion::identity(), TrackingState::Tracked)
    }
}

impl Default for JointSample {
    fn default() -> Self {
        Self::new(
            Vector3::zeros(),
            UnitQuaternion::identity(),
            TrackingState::NotTracked,
        )
    }
}

/// Flat wire layout of a joint sample: position, orientation (w, x, y, z), state.
#[derive(Serialize, Deserialize)]
struct JointRecord {
    position: [f64; 3],
    orientation: [f64; 4],
    tracking_state: TrackingState,
}

impl From<JointSample> for JointRecord {
    fn from(sample: JointSample) -> Self {
        let q = sample.orientation.quaternion();
        Self {
            position: [sample.position.x, sample.position.y, sample.position.z],
            orientation: [q.w, q.i, q.j, q.k],
            tracking_state: sample.tracking_state,
        }
    }
}

impl From<JointRecord> for JointSample {
    fn from(record: JointRecord) -> Self {
        let [x, y, z] = record.position;
        let [w, i, j, k] = record.orientation;
        // Written as unit quaternions; read back bit-exact without renormalizing.
        Self {
            position: Vector3::new(x, y, z),
            orientation: UnitQuaternion::new_unchecked(Quaternion::new(w, i, j, k)),
            tracking_state: record.tracking_state,
        }
    }
}
