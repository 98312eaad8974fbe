//! Reference offsets of a processed take.

use contracts::{Frame, PoseOffsets};
use skeleton::BodyModel;

/// Pelvis position and mean ankle height relative to it, from `frames[0]`.
///
/// `None` for an empty sequence or a model without pelvis/ankle landmarks.
pub fn calculate_offsets(model: &BodyModel, frames: &[Frame]) -> Option<PoseOffsets> {
    let first = frames.first()?;
    let landmarks = model.landmarks();
    let pelvis = first.position(landmarks.pelvis?);
    let (left, right) = landmarks.ankles()?;
    let ankles = (first.position(left).y + first.position(right).y) / 2.0;

    Some(PoseOffsets {
        pelvis,
        feet: ankles - pelvis.y,
    })
}
