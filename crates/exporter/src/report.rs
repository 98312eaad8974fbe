//! Plain-text reports: sequence log, limb lengths, joint hierarchy.

use std::fmt::Write as _;

use contracts::{LimbReport, MotionArchive, MotionSequence, MotionStage, Subject};
use skeleton::JointHierarchy;

/// Per-stage table of sizes, durations and the serial/timestamp of every index
/// for both subjects, up to the longest raw sequence.
///
/// Indices past the end of a sequence print `0` / `0`.
pub fn sequence_log(archive: &MotionArchive) -> String {
    let rows = archive.longest_raw_len();
    let mut out = String::new();

    let _ = writeln!(out, "{:<14}{:>20}{:>20}", "Motion", "Athlete", "Trainer");
    for stage in MotionStage::ALL {
        let athlete = archive.subject(Subject::Athlete).stage(stage);
        let trainer = archive.subject(Subject::Trainer).stage(stage);

        let _ = writeln!(out, "{}", stage.title());
        let _ = writeln!(out, "{:<14}{:>20}{:>20}", "Size:", athlete.len(), trainer.len());
        let _ = writeln!(
            out,
            "{:<14}{:>20.6}{:>20.6}",
            "Duration:",
            athlete.duration(),
            trainer.duration()
        );
        for index in 0..rows {
            let (a_serial, a_time) = serial_and_time(athlete, index);
            let (t_serial, t_time) = serial_and_time(trainer, index);
            let _ = writeln!(
                out,
                "{index:<14}{a_serial:>5}{a_time:>15.6}{t_serial:>5}{t_time:>15.6}"
            );
        }
    }
    out
}

fn serial_and_time(sequence: &MotionSequence, index: usize) -> (i32, f64) {
    sequence
        .get(index)
        .map(|f| (f.serial, f.timestamp))
        .unwrap_or((0, 0.0))
}

/// `name Min=.. (serial) Max=.. (serial) Avg=.. Des=.. Gap=..` per limb, then `GapAverage`.
pub fn limb_report(report: &LimbReport) -> String {
    let mut out = String::from("Limb lengths:\n");
    for limb in &report.limbs {
        let _ = writeln!(
            out,
            "{:<40} Min={:<10.6} ({:<5}) Max={:<10.6} ({:<5}) Avg={:<10.6}  Des={:<10.6} Gap={:<10.6}",
            limb.name,
            limb.min_length,
            limb.serial_min,
            limb.max_length,
            limb.serial_max,
            limb.average_length,
            limb.desired_length,
            limb.gap(),
        );
    }
    let _ = writeln!(out, "GapAverage={}", report.gap_average);
    out
}

/// `Joint n: name Parent: p Children (k): ...`, one line per joint in id order.
pub fn hierarchy_listing(hierarchy: &JointHierarchy) -> String {
    let mut out = String::new();
    for id in hierarchy.ids() {
        let parent = hierarchy
            .parent_of(id)
            .map(|p| hierarchy.name_of(p))
            .unwrap_or("NONE");
        let children = hierarchy.children_of(id);
        let _ = write!(
            out,
            "Joint {:<2}: {:<20} Parent: {:<20} Children ({}): ",
            id.index(),
            hierarchy.name_of(id),
            parent,
            children.len()
        );
        for child in children {
            let _ = write!(out, "{} ", hierarchy.name_of(*child));
        }
        out.push('\n');
    }
    out
}
