//! # Skeleton
//!
//! Static body topology: the joint hierarchy, the ordered limb table, the
//! per-joint orientation rules and the landmarks used by special processing
//! steps. Built once, validated at construction and shared read-only.

mod error;
mod hierarchy;
mod limbs;
mod model;

pub use error::SkeletonError;
pub use hierarchy::{JointHierarchy, JointNode};
pub use limbs::{Limb, LimbRole, LimbTable};
pub use model::{kinect_rest_pose, BodyModel, FrontRule, Landmarks};
