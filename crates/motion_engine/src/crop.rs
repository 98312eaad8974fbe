//! Lead-in / lead-out removal.

use contracts::MotionSequence;

/// Drop `margin` frames from both ends; sequences of `2·margin` frames or
/// fewer become empty.
pub fn crop(sequence: &mut MotionSequence, margin: usize) {
    if sequence.len() <= 2 * margin {
        sequence.clear();
        return;
    }
    let keep = sequence.len() - margin;
    sequence.truncate(keep);
    sequence.drain(..margin);
}
