//! Limb table
//!
//! A limb is the segment between two joints whose length should stay constant
//! over a recording. Table order matters: correction runs limb by limb in this
//! order, and a limb moved later may disturb the end points of an earlier one.

use contracts::JointId;

use crate::{JointHierarchy, SkeletonError};

/// How a limb relates to the joint tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimbRole {
    /// Connects adjacent joints (or a joint and a descendant); its length holds
    /// exactly after correction
    #[default]
    Segment,
    /// Connects non-adjacent joints; later segments may move its end points
    Helper,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Limb {
    /// `Start->End`, filled in by [`LimbTable::new`]
    pub name: String,
    pub start: JointId,
    pub end: JointId,
    /// Index of the left/right counterpart
    pub sibling: Option<usize>,
    pub role: LimbRole,
}

impl Limb {
    pub fn new(start: impl Into<JointId>, end: impl Into<JointId>) -> Self {
        Self {
            name: String::new(),
            start: start.into(),
            end: end.into(),
            sibling: None,
            role: LimbRole::Segment,
        }
    }

    pub fn with_sibling(mut self, sibling: usize) -> Self {
        self.sibling = Some(sibling);
        self
    }

    pub fn helper(mut self) -> Self {
        self.role = LimbRole::Helper;
        self
    }
}

/// Validated, ordered limb list.
#[derive(Debug, Clone)]
pub struct LimbTable {
    limbs: Vec<Limb>,
}

impl LimbTable {
    /// # Errors
    /// Fails when a limb references a joint outside `hierarchy`, starts and ends
    /// at the same joint, or has an out-of-range or non-mutual sibling.
    pub fn new(mut limbs: Vec<Limb>, hierarchy: &JointHierarchy) -> Result<Self, SkeletonError> {
        for (index, limb) in limbs.iter_mut().enumerate() {
            for joint in [limb.start, limb.end] {
                if !hierarchy.contains(joint) {
                    return Err(SkeletonError::UndefinedLimbJoint { index, joint });
                }
            }
            if limb.start == limb.end {
                return Err(SkeletonError::ZeroLengthLimb { index });
            }
            limb.name = format!(
                "{}->{}",
                hierarchy.name_of(limb.start),
                hierarchy.name_of(limb.end)
            );
        }

        for (index, limb) in limbs.iter().enumerate() {
            let Some(sibling) = limb.sibling else {
                continue;
            };
            if sibling >= limbs.len() || sibling == index {
                return Err(SkeletonError::InvalidSibling { index, sibling });
            }
            if limbs[sibling].sibling != Some(index) {
                return Err(SkeletonError::AsymmetricSibling { index, sibling });
            }
        }

        Ok(Self { limbs })
    }

    pub fn len(&self) -> usize {
        self.limbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limbs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Limb> {
        self.limbs.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Limb> {
        self.limbs.iter()
    }

    /// Index of the limb running from `start` to `end`.
    pub fn find(&self, start: JointId, end: JointId) -> Option<usize> {
        self.limbs
            .iter()
            .position(|l| l.start == start && l.end == end)
    }
}

impl<'a> IntoIterator for &'a LimbTable {
    type Item = &'a Limb;
    type IntoIter = std::slice::Iter<'a, Limb>;

    fn into_iter(self) -> Self::IntoIter {
        self.limbs.iter()
    }
}
