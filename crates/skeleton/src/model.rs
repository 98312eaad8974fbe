//! Body model: hierarchy + limbs + orientation rules + landmarks.

use contracts::{JointId, KinectJoint};
use nalgebra::Vector3;
use tracing::info;

use crate::{JointHierarchy, JointNode, Limb, LimbTable, SkeletonError};

/// How a joint's forward axis is derived.
///
/// With `to_parent`/`to_helper` the unit vectors from the joint to its parent and
/// helper, `left = to_parent × to_helper` and `front = to_parent × left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrontRule {
    /// `front`
    #[default]
    Generic,
    /// `left`
    Left,
    /// `-left`
    NegLeft,
    /// `-front`
    NegFront,
    /// `(pos[left] - pos[right]) × up`, for joints on the body's midline
    Across { left: JointId, right: JointId },
}

/// Optional joints used by special processing steps.
///
/// A step whose landmarks are missing is skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Landmarks {
    pub pelvis: Option<JointId>,
    pub left_hip: Option<JointId>,
    pub right_hip: Option<JointId>,
    pub left_ankle: Option<JointId>,
    pub right_ankle: Option<JointId>,
    pub left_foot: Option<JointId>,
    pub right_foot: Option<JointId>,
    pub left_hand: Option<JointId>,
    pub right_hand: Option<JointId>,
    pub left_thumb: Option<JointId>,
    pub right_thumb: Option<JointId>,
}

impl Landmarks {
    fn each(&self) -> [(&'static str, Option<JointId>); 11] {
        [
            ("pelvis", self.pelvis),
            ("left_hip", self.left_hip),
            ("right_hip", self.right_hip),
            ("left_ankle", self.left_ankle),
            ("right_ankle", self.right_ankle),
            ("left_foot", self.left_foot),
            ("right_foot", self.right_foot),
            ("left_hand", self.left_hand),
            ("right_hand", self.right_hand),
            ("left_thumb", self.left_thumb),
            ("right_thumb", self.right_thumb),
        ]
    }

    pub fn feet(&self) -> Option<(JointId, JointId)> {
        self.left_foot.zip(self.right_foot)
    }

    pub fn hips(&self) -> Option<(JointId, JointId)> {
        self.left_hip.zip(self.right_hip)
    }

    pub fn ankles(&self) -> Option<(JointId, JointId)> {
        self.left_ankle.zip(self.right_ankle)
    }
}

/// Complete, validated description of a tracked body.
#[derive(Debug, Clone)]
pub struct BodyModel {
    name: String,
    hierarchy: JointHierarchy,
    limbs: LimbTable,
    front_rules: Vec<FrontRule>,
    landmarks: Landmarks,
}

impl BodyModel {
    /// # Errors
    /// Fails when the rule table does not cover every joint or a rule or
    /// landmark references a joint outside the hierarchy.
    pub fn new(
        name: impl Into<String>,
        hierarchy: JointHierarchy,
        limbs: LimbTable,
        front_rules: Vec<FrontRule>,
        landmarks: Landmarks,
    ) -> Result<Self, SkeletonError> {
        if front_rules.len() != hierarchy.len() {
            return Err(SkeletonError::RuleCount {
                expected: hierarchy.len(),
                actual: front_rules.len(),
            });
        }
        for (index, rule) in front_rules.iter().enumerate() {
            if let FrontRule::Across { left, right } = rule {
                for joint in [*left, *right] {
                    if !hierarchy.contains(joint) {
                        return Err(SkeletonError::UndefinedReference {
                            what: format!("front rule of joint {index}"),
                            joint,
                        });
                    }
                }
            }
        }
        for (what, joint) in landmarks.each() {
            if let Some(joint) = joint {
                if !hierarchy.contains(joint) {
                    return Err(SkeletonError::UndefinedReference {
                        what: format!("landmark {what}"),
                        joint,
                    });
                }
            }
        }

        Ok(Self {
            name: name.into(),
            hierarchy,
            limbs,
            front_rules,
            landmarks,
        })
    }

    /// Kinect v2 body: 25 joints, 23 limbs.
    pub fn kinect_v2() -> Result<Self, SkeletonError> {
        use KinectJoint::*;

        let id = |j: KinectJoint| Some(j.id());
        let parent_helper = |joint: KinectJoint| -> (Option<JointId>, Option<JointId>) {
            match joint {
                SpineBase => (None, None),
                SpineMid => (id(SpineBase), id(HipRight)),
                Neck => (id(SpineShoulder), id(Head)),
                Head => (id(Neck), id(SpineShoulder)),
                ShoulderLeft => (id(SpineShoulder), id(ElbowLeft)),
                ElbowLeft => (id(ShoulderLeft), id(WristLeft)),
                WristLeft => (id(ElbowLeft), id(ThumbLeft)),
                HandLeft => (id(WristLeft), id(ThumbLeft)),
                ShoulderRight => (id(SpineShoulder), id(ElbowRight)),
                ElbowRight => (id(ShoulderRight), id(WristRight)),
                WristRight => (id(ElbowRight), id(ThumbRight)),
                HandRight => (id(WristRight), id(ThumbRight)),
                HipLeft => (id(SpineBase), None),
                KneeLeft => (id(HipLeft), id(AnkleLeft)),
                AnkleLeft => (id(KneeLeft), id(FootLeft)),
                FootLeft => (id(AnkleLeft), id(KneeLeft)),
                HipRight => (id(SpineBase), None),
                KneeRight => (id(HipRight), id(AnkleRight)),
                AnkleRight => (id(KneeRight), id(FootRight)),
                FootRight => (id(AnkleRight), id(KneeRight)),
                SpineShoulder => (id(SpineMid), id(Neck)),
                HandTipLeft => (id(HandLeft), None),
                ThumbLeft => (id(HandLeft), None),
                HandTipRight => (id(HandRight), None),
                ThumbRight => (id(HandRight), None),
            }
        };

        let nodes = KinectJoint::ALL
            .iter()
            .map(|&joint| {
                let (parent, helper) = parent_helper(joint);
                JointNode::new(joint.name(), parent, helper)
            })
            .collect();
        let hierarchy = JointHierarchy::new(nodes)?;

        let limbs = vec![
            Limb::new(SpineBase, SpineShoulder),
            Limb::new(SpineBase, HipLeft).with_sibling(2),
            Limb::new(SpineBase, HipRight).with_sibling(1),
            Limb::new(HipLeft, KneeLeft).with_sibling(4),
            Limb::new(HipRight, KneeRight).with_sibling(3),
            Limb::new(KneeLeft, AnkleLeft).with_sibling(6),
            Limb::new(KneeRight, AnkleRight).with_sibling(5),
            Limb::new(AnkleLeft, FootLeft).with_sibling(8),
            Limb::new(AnkleRight, FootRight).with_sibling(7),
            // Must precede 11/12, which move the shoulders again.
            Limb::new(SpineBase, ShoulderLeft).helper(),
            Limb::new(SpineBase, ShoulderRight).helper(),
            Limb::new(SpineShoulder, ShoulderLeft).with_sibling(12),
            Limb::new(SpineShoulder, ShoulderRight).with_sibling(11),
            Limb::new(ShoulderLeft, ElbowLeft).with_sibling(14),
            Limb::new(ShoulderRight, ElbowRight).with_sibling(13),
            Limb::new(ElbowLeft, WristLeft).with_sibling(16),
            Limb::new(ElbowRight, WristRight).with_sibling(15),
            Limb::new(WristLeft, HandLeft).with_sibling(18),
            Limb::new(WristRight, HandRight).with_sibling(17),
            Limb::new(WristLeft, HandTipLeft).with_sibling(20),
            Limb::new(WristRight, HandTipRight).with_sibling(19),
            Limb::new(HandLeft, ThumbLeft).with_sibling(22),
            Limb::new(HandRight, ThumbRight).with_sibling(21),
        ];
        let limbs = LimbTable::new(limbs, &hierarchy)?;

        let shoulders = FrontRule::Across {
            left: ShoulderLeft.id(),
            right: ShoulderRight.id(),
        };
        let front_rules = KinectJoint::ALL
            .iter()
            .map(|&joint| match joint {
                SpineMid => FrontRule::Across {
                    left: HipLeft.id(),
                    right: HipRight.id(),
                },
                SpineShoulder | Neck | Head => shoulders,
                ShoulderLeft | ElbowLeft | KneeRight | AnkleLeft | FootLeft => FrontRule::Left,
                ShoulderRight | ElbowRight | WristLeft | WristRight | AnkleRight | FootRight => {
                    FrontRule::NegLeft
                }
                HandLeft | HandRight => FrontRule::NegFront,
                _ => FrontRule::Generic,
            })
            .collect();

        let landmarks = Landmarks {
            pelvis: id(SpineBase),
            left_hip: id(HipLeft),
            right_hip: id(HipRight),
            left_ankle: id(AnkleLeft),
            right_ankle: id(AnkleRight),
            left_foot: id(FootLeft),
            right_foot: id(FootRight),
            left_hand: id(HandLeft),
            right_hand: id(HandRight),
            left_thumb: id(ThumbLeft),
            right_thumb: id(ThumbRight),
        };

        let model = Self::new("kinect_v2", hierarchy, limbs, front_rules, landmarks)?;
        info!(
            joints = model.joint_count(),
            limbs = model.limbs.len(),
            "body model ready"
        );
        Ok(model)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hierarchy(&self) -> &JointHierarchy {
        &self.hierarchy
    }

    pub fn limbs(&self) -> &LimbTable {
        &self.limbs
    }

    pub fn landmarks(&self) -> &Landmarks {
        &self.landmarks
    }

    pub fn front_rule(&self, joint: JointId) -> FrontRule {
        self.front_rules[joint.index()]
    }

    pub fn joint_count(&self) -> usize {
        self.hierarchy.len()
    }
}

/// Standing Kinect v2 pose in camera space (meters), arms and knees slightly bent.
///
/// Every parent/joint/helper triple is non-collinear, so orientations are
/// well defined for the whole skeleton.
pub fn kinect_rest_pose() -> Vec<Vector3<f64>> {
    use KinectJoint::*;

    KinectJoint::ALL
        .iter()
        .map(|joint| {
            let (x, y, z) = match joint {
                SpineBase => (0.0, 0.95, 2.5),
                SpineMid => (0.0, 1.20, 2.52),
                Neck => (0.0, 1.50, 2.5),
                Head => (0.0, 1.65, 2.48),
                ShoulderLeft => (-0.18, 1.42, 2.5),
                ElbowLeft => (-0.20, 1.15, 2.45),
                WristLeft => (-0.22, 0.92, 2.33),
                HandLeft => (-0.22, 0.85, 2.30),
                ShoulderRight => (0.18, 1.42, 2.5),
                ElbowRight => (0.20, 1.15, 2.45),
                WristRight => (0.22, 0.92, 2.33),
                HandRight => (0.22, 0.85, 2.30),
                HipLeft => (-0.09, 0.92, 2.5),
                KneeLeft => (-0.10, 0.50, 2.45),
                AnkleLeft => (-0.10, 0.10, 2.5),
                FootLeft => (-0.10, 0.05, 2.38),
                HipRight => (0.09, 0.92, 2.5),
                KneeRight => (0.10, 0.50, 2.45),
                AnkleRight => (0.10, 0.10, 2.5),
                FootRight => (0.10, 0.05, 2.38),
                SpineShoulder => (0.0, 1.43, 2.5),
                HandTipLeft => (-0.22, 0.77, 2.28),
                ThumbLeft => (-0.19, 0.84, 2.27),
                HandTipRight => (0.22, 0.77, 2.28),
                ThumbRight => (0.19, 0.84, 2.27),
            };
            Vector3::new(x, y, z)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LimbRole;

    #[test]
    fn test_kinect_hierarchy() {
        let model = BodyModel::kinect_v2().unwrap();
        let h = model.hierarchy();
        assert_eq!(model.joint_count(), 25);
        assert_eq!(h.root(), KinectJoint::SpineBase.id());
        assert_eq!(
            h.parent_of(KinectJoint::SpineShoulder.id()),
            Some(KinectJoint::SpineMid.id())
        );
        assert_eq!(
            h.children_of(KinectJoint::SpineShoulder.id()),
            &[
                KinectJoint::Neck.id(),
                KinectJoint::ShoulderLeft.id(),
                KinectJoint::ShoulderRight.id()
            ]
        );
        assert_eq!(h.topological_order().len(), 25);
        assert_eq!(h.subtree(KinectJoint::SpineBase.id()).len(), 25);
    }

    #[test]
    fn test_kinect_limb_order() {
        let model = BodyModel::kinect_v2().unwrap();
        let limbs = model.limbs();
        assert_eq!(limbs.len(), 23);
        assert_eq!(limbs.get(0).unwrap().name, "SpineBase->SpineShoulder");
        assert_eq!(limbs.get(0).unwrap().sibling, None);
        assert_eq!(limbs.get(9).unwrap().role, LimbRole::Helper);
        assert_eq!(limbs.get(10).unwrap().role, LimbRole::Helper);
        assert_eq!(limbs.get(9).unwrap().sibling, None);
        assert_eq!(limbs.get(10).unwrap().sibling, None);
        assert_eq!(limbs.get(11).unwrap().name, "SpineShoulder->ShoulderLeft");
        assert_eq!(limbs.get(22).unwrap().name, "HandRight->ThumbRight");
        for (i, limb) in limbs.iter().enumerate().skip(1) {
            if limb.role == LimbRole::Helper {
                continue;
            }
            let sibling = if i % 2 == 1 { i + 1 } else { i - 1 };
            assert_eq!(limb.sibling, Some(sibling), "limb {}", limb.name);
        }
    }

    #[test]
    fn test_kinect_front_rules() {
        let model = BodyModel::kinect_v2().unwrap();
        assert_eq!(
            model.front_rule(KinectJoint::SpineMid.id()),
            FrontRule::Across {
                left: KinectJoint::HipLeft.id(),
                right: KinectJoint::HipRight.id()
            }
        );
        assert_eq!(model.front_rule(KinectJoint::KneeLeft.id()), FrontRule::Generic);
        assert_eq!(model.front_rule(KinectJoint::KneeRight.id()), FrontRule::Left);
        assert_eq!(model.front_rule(KinectJoint::WristLeft.id()), FrontRule::NegLeft);
        assert_eq!(model.front_rule(KinectJoint::HandRight.id()), FrontRule::NegFront);
    }

    #[test]
    fn test_rule_table_must_cover_every_joint() {
        let hierarchy = JointHierarchy::new(vec![JointNode::root("R")]).unwrap();
        let limbs = LimbTable::new(vec![], &hierarchy).unwrap();
        assert!(matches!(
            BodyModel::new("x", hierarchy, limbs, vec![], Landmarks::default()),
            Err(SkeletonError::RuleCount { expected: 1, actual: 0 })
        ));
    }

    #[test]
    fn test_landmark_out_of_range() {
        let hierarchy = JointHierarchy::new(vec![JointNode::root("R")]).unwrap();
        let limbs = LimbTable::new(vec![], &hierarchy).unwrap();
        let landmarks = Landmarks {
            left_foot: Some(JointId::new(3)),
            ..Landmarks::default()
        };
        assert!(matches!(
            BodyModel::new("x", hierarchy, limbs, vec![FrontRule::Generic], landmarks),
            Err(SkeletonError::UndefinedReference { .. })
        ));
    }

    #[test]
    fn test_rest_pose_triples_not_collinear() {
        let model = BodyModel::kinect_v2().unwrap();
        let pose = kinect_rest_pose();
        let h = model.hierarchy();
        for joint in h.ids() {
            if let (Some(parent), Some(helper)) = (h.parent_of(joint), h.helper_of(joint)) {
                let to_parent = pose[parent.index()] - pose[joint.index()];
                let to_helper = pose[helper.index()] - pose[joint.index()];
                assert!(
                    to_parent.cross(&to_helper).norm() > 1e-4,
                    "{} is collinear",
                    h.name_of(joint)
                );
            }
        }
    }
}
