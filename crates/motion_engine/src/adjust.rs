//! Limb-length normalization.
//!
//! Every limb is rescaled to its desired length (mean of its own and its
//! sibling's average length over the take) by sliding the end joint and its
//! whole subtree along the limb direction. Limbs are processed in table order
//! and each direction is measured on the frame as corrected so far.

use contracts::{Frame, JointId, LimbReport, LimbStats, MotionSequence, ProcessingConfig};
use nalgebra::Vector3;
use skeleton::{BodyModel, LimbTable};
use tracing::{debug, instrument};

use crate::diagnostics::{Anomaly, Diagnostics};

/// Length statistics of every limb over `frames`.
///
/// Empty input yields an empty report.
pub fn calculate_limb_lengths(frames: &[Frame], limbs: &LimbTable) -> LimbReport {
    if frames.is_empty() || limbs.is_empty() {
        return LimbReport::default();
    }

    let mut stats: Vec<LimbStats> = limbs
        .iter()
        .map(|limb| {
            let mut min = (f64::INFINITY, 0);
            let mut max = (f64::NEG_INFINITY, 0);
            let mut sum = 0.0;
            for frame in frames {
                let length = (frame.position(limb.end) - frame.position(limb.start)).norm();
                sum += length;
                if length < min.0 {
                    min = (length, frame.serial);
                }
                if length > max.0 {
                    max = (length, frame.serial);
                }
            }
            LimbStats {
                name: limb.name.clone(),
                min_length: min.0,
                max_length: max.0,
                average_length: sum / frames.len() as f64,
                desired_length: 0.0,
                serial_min: min.1,
                serial_max: max.1,
            }
        })
        .collect();

    let averages: Vec<f64> = stats.iter().map(|s| s.average_length).collect();
    for (limb, stat) in limbs.iter().zip(stats.iter_mut()) {
        stat.desired_length = match limb.sibling {
            Some(sibling) => (averages[sibling] + stat.average_length) / 2.0,
            None => stat.average_length,
        };
    }

    let gap_sum: f64 = stats.iter().map(LimbStats::gap).sum();
    let gap_average = gap_sum / (stats.len().saturating_sub(1).max(1)) as f64;

    LimbReport {
        limbs: stats,
        gap_average,
    }
}

/// Corrected sequence with the limb statistics before and after.
#[derive(Debug, Clone)]
pub struct Adjustment {
    pub sequence: MotionSequence,
    pub before: LimbReport,
    pub after: LimbReport,
}

#[derive(Debug, Clone)]
pub struct Adjuster<'a> {
    model: &'a BodyModel,
    min_limb_length: f64,
    ground_feet: bool,
    repoint_thumbs: bool,
}

impl<'a> Adjuster<'a> {
    pub fn new(model: &'a BodyModel, config: &ProcessingConfig) -> Self {
        Self {
            model,
            min_limb_length: config.min_limb_length,
            ground_feet: config.ground_feet,
            repoint_thumbs: config.repoint_thumbs,
        }
    }

    #[instrument(name = "motion_adjust", skip_all, fields(frames = frames.len()))]
    pub fn adjust(&self, frames: &[Frame], diagnostics: &mut Diagnostics) -> Adjustment {
        let limbs = self.model.limbs();
        let before = calculate_limb_lengths(frames, limbs);
        let desired = before.desired_lengths();

        let subtrees: Vec<Vec<JointId>> = limbs
            .iter()
            .map(|limb| self.model.hierarchy().subtree(limb.end))
            .collect();

        let sequence: MotionSequence = frames
            .iter()
            .map(|frame| self.adjust_frame(frame, &desired, &subtrees, diagnostics))
            .collect();

        let after = calculate_limb_lengths(&sequence, limbs);
        debug!(
            gap_before = before.gap_average,
            gap_after = after.gap_average,
            "limb lengths normalized"
        );

        Adjustment {
            sequence,
            before,
            after,
        }
    }

    fn adjust_frame(
        &self,
        frame: &Frame,
        desired: &[f64],
        subtrees: &[Vec<JointId>],
        diagnostics: &mut Diagnostics,
    ) -> Frame {
        let landmarks = self.model.landmarks();
        let mut out = frame.clone();
        let mut left_foot = Vector3::zeros();
        let mut right_foot = Vector3::zeros();

        for (index, limb) in self.model.limbs().iter().enumerate() {
            let direction = out.position(limb.end) - out.position(limb.start);
            let current = direction.norm();
            if current < self.min_limb_length {
                diagnostics.report(Anomaly::DegenerateLimb {
                    serial: frame.serial,
                    limb: limb.name.clone(),
                    length: current,
                });
                continue;
            }

            let factor = desired[index] / current;
            let delta = -(1.0 - factor) * direction;

            for &joint in &subtrees[index] {
                out.joint_mut(joint).position += delta;
                if Some(joint) == landmarks.left_foot {
                    left_foot += delta;
                }
                if Some(joint) == landmarks.right_foot {
                    right_foot += delta;
                }
            }
        }

        if self.repoint_thumbs {
            self.repoint_thumbs(&mut out, desired);
        }

        if self.ground_feet && landmarks.feet().is_some() {
            let shift = -(left_foot.y + right_foot.y) / 2.0;
            for joint in out.joints.iter_mut() {
                joint.position.y += shift;
            }
        }

        out
    }

    /// Thumbs point from each hand towards the other hand.
    fn repoint_thumbs(&self, frame: &mut Frame, desired: &[f64]) {
        let landmarks = self.model.landmarks();
        let limbs = self.model.limbs();
        let (Some(hand_l), Some(hand_r), Some(thumb_l), Some(thumb_r)) = (
            landmarks.left_hand,
            landmarks.right_hand,
            landmarks.left_thumb,
            landmarks.right_thumb,
        ) else {
            return;
        };
        let (Some(limb_l), Some(limb_r)) = (limbs.find(hand_l, thumb_l), limbs.find(hand_r, thumb_r))
        else {
            return;
        };

        let left = frame.position(hand_l);
        let right = frame.position(hand_r);
        let Some(n) = (left - right).try_normalize(self.min_limb_length.max(f64::EPSILON)) else {
            return;
        };

        frame.joint_mut(thumb_l).position = left - n * desired[limb_l];
        frame.joint_mut(thumb_r).position = right + n * desired[limb_r];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{JointSample, KinectJoint};
    use skeleton::{
        kinect_rest_pose, FrontRule, JointHierarchy, JointNode, Landmarks, Limb, LimbRole,
    };

    fn two_joint_model() -> BodyModel {
        let hierarchy = JointHierarchy::new(vec![
            JointNode::root("A"),
            JointNode::new("B", Some(JointId::new(0)), None),
        ])
        .unwrap();
        let limbs = LimbTable::new(vec![Limb::new(0u16, 1u16)], &hierarchy).unwrap();
        BodyModel::new(
            "pair",
            hierarchy,
            limbs,
            vec![FrontRule::Generic; 2],
            Landmarks::default(),
        )
        .unwrap()
    }

    fn pair_frame(serial: i32, length: f64) -> Frame {
        Frame::new(
            serial,
            serial as f64,
            vec![
                JointSample::tracked(Vector3::new(1.0, 1.0, 1.0)),
                JointSample::tracked(Vector3::new(1.0, 1.0 + length, 1.0)),
            ],
        )
    }

    #[test]
    fn test_limb_statistics() {
        let model = two_joint_model();
        let frames = vec![pair_frame(0, 1.0), pair_frame(1, 1.2), pair_frame(2, 0.8)];
        let report = calculate_limb_lengths(&frames, model.limbs());

        let stats = &report.limbs[0];
        assert_eq!(stats.name, "A->B");
        assert!((stats.average_length - 1.0).abs() < 1e-12);
        assert!((stats.desired_length - 1.0).abs() < 1e-12);
        assert_eq!(stats.serial_min, 2);
        assert_eq!(stats.serial_max, 1);
        assert!((stats.gap() - 0.4).abs() < 1e-12);
        // A single limb divides by one
        assert!((report.gap_average - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_two_joint_adjustment() {
        let model = two_joint_model();
        let frames = vec![pair_frame(0, 1.0), pair_frame(1, 1.2), pair_frame(2, 0.8)];
        let mut diagnostics = Diagnostics::new();
        let adjustment = Adjuster::new(&model, &ProcessingConfig::default())
            .adjust(&frames, &mut diagnostics);

        assert!(diagnostics.is_empty());
        for frame in adjustment.sequence.iter() {
            let d = (frame.position(JointId::new(1)) - frame.position(JointId::new(0))).norm();
            assert!((d - 1.0).abs() < 1e-12);
            // Root stays put
            assert_eq!(frame.position(JointId::new(0)), Vector3::new(1.0, 1.0, 1.0));
        }
        assert!(adjustment.after.gap_average < 1e-12);
        assert!((adjustment.before.gap_average - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_limb_left_alone() {
        let model = two_joint_model();
        let frames = vec![pair_frame(0, 1.0), pair_frame(1, 0.0)];
        let mut diagnostics = Diagnostics::new();
        let adjustment = Adjuster::new(&model, &ProcessingConfig::default())
            .adjust(&frames, &mut diagnostics);

        assert_eq!(diagnostics.count("degenerate_limb"), 1);
        let frame = &adjustment.sequence[1];
        assert_eq!(frame.position(JointId::new(1)), frame.position(JointId::new(0)));
        assert!(frame.joints.iter().all(|j| j.position.iter().all(|v| v.is_finite())));
    }

    fn noisy_kinect_take() -> Vec<Frame> {
        let rest = kinect_rest_pose();
        (0..12)
            .map(|i| {
                let joints = rest
                    .iter()
                    .enumerate()
                    .map(|(j, p)| {
                        let wobble = ((i * 7 + j * 3) % 5) as f64 * 0.004 - 0.008;
                        JointSample::tracked(p + Vector3::new(wobble, -wobble, 0.5 * wobble))
                    })
                    .collect();
                Frame::new(i as i32, i as f64 / 30.0, joints)
            })
            .collect()
    }

    #[test]
    fn test_kinect_segments_hold_desired_length() {
        let model = BodyModel::kinect_v2().unwrap();
        let frames = noisy_kinect_take();
        let mut diagnostics = Diagnostics::new();
        let adjustment = Adjuster::new(&model, &ProcessingConfig::default())
            .adjust(&frames, &mut diagnostics);

        assert!(diagnostics.is_empty());
        let desired = adjustment.before.desired_lengths();
        for frame in adjustment.sequence.iter() {
            for (index, limb) in model.limbs().iter().enumerate() {
                if limb.role != LimbRole::Segment {
                    continue;
                }
                let d = (frame.position(limb.end) - frame.position(limb.start)).norm();
                assert!(
                    (d - desired[index]).abs() < 1e-9,
                    "{} in frame {}: {} vs {}",
                    limb.name,
                    frame.serial,
                    d,
                    desired[index]
                );
            }
        }
        assert!(adjustment.after.gap_average < adjustment.before.gap_average);
    }

    #[test]
    fn test_siblings_become_symmetric() {
        let model = BodyModel::kinect_v2().unwrap();
        let adjustment = Adjuster::new(&model, &ProcessingConfig::default())
            .adjust(&noisy_kinect_take(), &mut Diagnostics::new());
        let after = &adjustment.after.limbs;
        // Forearms (15/16) end up the same length
        assert!((after[15].average_length - after[16].average_length).abs() < 1e-9);
    }

    #[test]
    fn test_helper_limbs_keep_their_own_average() {
        let model = BodyModel::kinect_v2().unwrap();
        let shoulder = KinectJoint::ShoulderLeft.id();
        let mut frames = noisy_kinect_take();
        for frame in &mut frames {
            frame.joint_mut(shoulder).position.x -= 0.1;
        }
        let report = calculate_limb_lengths(&frames, model.limbs());

        let left = &report.limbs[9];
        let right = &report.limbs[10];
        assert!(left.average_length > right.average_length + 0.01);
        assert_eq!(left.desired_length, left.average_length);
        assert_eq!(right.desired_length, right.average_length);
        // The shoulder pair itself is still averaged
        let pair = (report.limbs[11].average_length + report.limbs[12].average_length) / 2.0;
        assert!((report.limbs[11].desired_length - pair).abs() < 1e-12);
    }

    #[test]
    fn test_grounding_keeps_feet_height() {
        let model = BodyModel::kinect_v2().unwrap();
        let frames = noisy_kinect_take();
        let adjustment = Adjuster::new(&model, &ProcessingConfig::default())
            .adjust(&frames, &mut Diagnostics::new());

        let left = KinectJoint::FootLeft.id();
        let right = KinectJoint::FootRight.id();
        for (input, output) in frames.iter().zip(adjustment.sequence.iter()) {
            let before = input.position(left).y + input.position(right).y;
            let after = output.position(left).y + output.position(right).y;
            assert!((before - after).abs() < 1e-9);
        }
    }

    #[test]
    fn test_thumbs_point_at_other_hand() {
        let model = BodyModel::kinect_v2().unwrap();
        let adjustment = Adjuster::new(&model, &ProcessingConfig::default())
            .adjust(&noisy_kinect_take(), &mut Diagnostics::new());

        let frame = &adjustment.sequence[0];
        let hand_l = frame.position(KinectJoint::HandLeft.id());
        let hand_r = frame.position(KinectJoint::HandRight.id());
        let thumb_l = frame.position(KinectJoint::ThumbLeft.id());
        let towards_right = (hand_r - hand_l).normalize();
        assert!(((thumb_l - hand_l).normalize() - towards_right).norm() < 1e-9);
    }
}
