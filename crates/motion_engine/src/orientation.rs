//! Joint orientations from relative joint geometry.
//!
//! Each joint with both a parent and a helper gets a look-rotation: local +Z
//! onto its forward axis and +Y towards its parent's opposite (`up`).

use std::f64::consts::PI;

use contracts::Frame;
use nalgebra::{UnitQuaternion, Vector3};
use skeleton::{BodyModel, FrontRule};
use tracing::{instrument, trace};

use crate::diagnostics::{Anomaly, Diagnostics};

const AXIS_EPSILON: f64 = 1e-9;

/// Recompute orientations of every frame in place.
#[instrument(name = "motion_orientations", skip_all, fields(frames = frames.len()))]
pub fn calculate_orientations(model: &BodyModel, frames: &mut [Frame], diagnostics: &mut Diagnostics) {
    let hierarchy = model.hierarchy();

    for frame in frames.iter_mut() {
        for joint in hierarchy.ids() {
            let (Some(parent), Some(helper)) = (hierarchy.parent_of(joint), hierarchy.helper_of(joint))
            else {
                continue;
            };

            let position = frame.position(joint);
            let to_parent = (frame.position(parent) - position)
                .try_normalize(AXIS_EPSILON)
                .unwrap_or_else(Vector3::zeros);
            let to_helper = (frame.position(helper) - position)
                .try_normalize(AXIS_EPSILON)
                .unwrap_or_else(Vector3::zeros);

            let up = -to_parent;
            let left = to_parent.cross(&to_helper);
            let front = to_parent.cross(&left);

            let front = match model.front_rule(joint) {
                FrontRule::Generic => front,
                FrontRule::Left => left,
                FrontRule::NegLeft => -left,
                FrontRule::NegFront => -front,
                FrontRule::Across { left, right } => {
                    (frame.position(left) - frame.position(right)).cross(&up)
                }
            };

            let orientation = look_rotation(&front, &up).unwrap_or_else(|| {
                diagnostics.report(Anomaly::DegenerateOrientation {
                    serial: frame.serial,
                    joint,
                });
                UnitQuaternion::identity()
            });
            frame.joint_mut(joint).orientation = orientation;
        }
        trace!(serial = frame.serial, "orientations updated");
    }
}

/// Rotation taking +Z onto `front` with +Y as close to `up` as possible.
///
/// `None` when `front` vanishes. With `up` parallel to `front` only the
/// forward axis is honoured.
pub fn look_rotation(front: &Vector3<f64>, up: &Vector3<f64>) -> Option<UnitQuaternion<f64>> {
    let forward = front.try_normalize(AXIS_EPSILON)?;

    if up.cross(&forward).norm() > AXIS_EPSILON {
        return Some(UnitQuaternion::face_towards(&forward, up));
    }

    Some(
        UnitQuaternion::rotation_between(&Vector3::z(), &forward)
            .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI)),
    )
}
