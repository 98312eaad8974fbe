//! Topology errors raised while building a body model.

use contracts::JointId;
use thiserror::Error;

/// Inconsistent joint hierarchy, limb table or rule table.
#[derive(Debug, Error, PartialEq)]
pub enum SkeletonError {
    #[error("joint table is empty")]
    Empty,

    #[error("joint table has {count} joints, at most {max} supported")]
    TooManyJoints { count: usize, max: usize },

    #[error("joint table has no root")]
    NoRoot,

    #[error("joint table has multiple roots: {roots:?}")]
    MultipleRoots { roots: Vec<String> },

    #[error("joint '{joint}' references undefined parent {parent}")]
    UndefinedParent { joint: String, parent: JointId },

    #[error("joint '{joint}' references undefined helper {helper}")]
    UndefinedHelper { joint: String, helper: JointId },

    #[error("parent links form a cycle through: {joints:?}")]
    Cycle { joints: Vec<String> },

    #[error("limb {index} references undefined joint {joint}")]
    UndefinedLimbJoint { index: usize, joint: JointId },

    #[error("limb {index} starts and ends at the same joint")]
    ZeroLengthLimb { index: usize },

    #[error("limb {index} has invalid sibling {sibling}")]
    InvalidSibling { index: usize, sibling: usize },

    #[error("limb {index} and its sibling {sibling} are not mutual")]
    AsymmetricSibling { index: usize, sibling: usize },

    #[error("front rule table has {actual} entries, expected {expected}")]
    RuleCount { expected: usize, actual: usize },

    #[error("{what} references undefined joint {joint}")]
    UndefinedReference { what: String, joint: JointId },
}
