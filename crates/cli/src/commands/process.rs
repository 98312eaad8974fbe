//! `process` command implementation.

use anyhow::{Context, Result};
use contracts::Subject;
use tracing::info;

use super::{body_model, build_dispatcher, load_blueprint, revalidate};
use crate::cli::ProcessArgs;
use crate::error::CliError;
use crate::pipeline::OfflineCapture;

/// Execute the `process` command
pub fn run_process(args: &ProcessArgs) -> Result<()> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;
    if let Some(depth) = args.delay_depth {
        info!(depth, "Overriding delay depth from CLI");
        blueprint.processing.delay_depth = depth;
    }
    revalidate(&blueprint)?;

    let subjects: Vec<Subject> = args.subjects.iter().map(|s| (*s).into()).collect();
    let model = body_model(blueprint.capture.body_model)?;
    let mut dispatcher = build_dispatcher(&blueprint, &model, args.output.as_deref())?;

    info!(
        subjects = ?subjects,
        seed = args.seed,
        delay_depth = blueprint.processing.delay_depth,
        "Processing synthetic takes"
    );

    let (stats, session) = OfflineCapture::new(blueprint, model, args.seed)
        .run(&subjects, &mut dispatcher)
        .context("Offline processing failed")?;

    if args.limbs {
        if let Some(processed) = session.latest() {
            println!("Before adjustment");
            print!("{}", exporter::limb_report(&processed.limbs_before));
            println!("After adjustment");
            print!("{}", exporter::limb_report(&processed.limbs_after));
            if let Some(offsets) = processed.offsets {
                println!(
                    "Offsets: pelvis=({:.4}, {:.4}, {:.4}) feet={:.4}",
                    offsets.pelvis.x, offsets.pelvis.y, offsets.pelvis.z, offsets.feet
                );
            }
        }
    }

    stats.print_summary();

    if !stats.failed_sinks.is_empty() {
        return Err(CliError::SinkFailures {
            names: stats.failed_sinks,
        }
        .into());
    }
    Ok(())
}
