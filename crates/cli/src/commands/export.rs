//! `export` command implementation.

use anyhow::{Context, Result};
use contracts::{MotionArchive, MotionSequence, MotionStage, ProcessingConfig, Subject};
use exporter::{MotionStore, TrcWriter};
use tracing::info;

use super::body_model;
use crate::cli::ExportArgs;
use crate::error::CliError;

/// Execute the `export` command
pub fn run_export(args: &ExportArgs) -> Result<()> {
    let model = body_model(Default::default())?;
    let archive = MotionStore::new(model.joint_count())
        .load(&args.input)
        .with_context(|| format!("Failed to load store {}", args.input.display()))?;
    print_archive_summary(&archive);

    let subject = Subject::from(args.subject);
    let stage = MotionStage::from(args.stage);
    let sequence = archive.subject(subject).stage(stage);

    if let Some(path) = &args.trc {
        if sequence.is_empty() {
            return Err(empty(subject, stage).into());
        }
        let rate = args.rate.unwrap_or_else(|| estimate_rate(sequence));
        TrcWriter::new(&model, rate)
            .write_file(path, sequence)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), rate, frames = sequence.len(), "TRC exported");
    }

    if let Some(path) = &args.sequence_log {
        std::fs::write(path, exporter::sequence_log(&archive))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "sequence log written");
    }

    if args.limbs {
        if sequence.is_empty() {
            return Err(empty(subject, stage).into());
        }
        let report = motion_engine::calculate_limb_lengths(sequence, model.limbs());
        println!("{} {}", subject.title(), stage.title());
        print!("{}", exporter::limb_report(&report));
    }

    Ok(())
}

fn empty(subject: Subject, stage: MotionStage) -> CliError {
    CliError::EmptySequence {
        subject,
        stage: stage.as_str().to_string(),
    }
}

/// Frames per second implied by the timestamps; the default rate for
/// sequences too short to tell.
fn estimate_rate(sequence: &MotionSequence) -> f64 {
    let span = match (sequence.first(), sequence.last()) {
        (Some(first), Some(last)) => last.timestamp - first.timestamp,
        _ => 0.0,
    };
    if sequence.len() > 1 && span > 0.0 {
        (sequence.len() - 1) as f64 / span
    } else {
        ProcessingConfig::default().frame_rate()
    }
}

fn print_archive_summary(archive: &MotionArchive) {
    println!("{:<14}{:>10}{:>10}", "Stage", "Athlete", "Trainer");
    for stage in MotionStage::ALL {
        println!(
            "{:<14}{:>10}{:>10}",
            stage.title(),
            archive.athlete.stage(stage).len(),
            archive.trainer.stage(stage).len()
        );
    }
}
