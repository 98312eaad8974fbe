//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Tracker timestamps are seconds (f64); after a recording is finalized they
//!   are relative to the first recorded frame, so lead-in frames are negative
//! - `serial` follows the same convention and is used for ordering/diagnostics
//!
//! ## Geometry
//! - Camera space, meters, y up (`nalgebra` vectors and unit quaternions)

mod blueprint;
mod error;
mod frame;
mod joint;
mod motion;
mod pose_source;
mod processing_config;
mod sink;

pub use blueprint::*;
pub use error::*;
pub use frame::{Frame, MotionSequence};
pub use joint::{JointId, JointSample, KinectJoint, TrackingState};
pub use motion::*;
pub use pose_source::{PoseCallback, PoseSample, PoseSource};
pub use processing_config::*;
pub use sink::MotionSink;
