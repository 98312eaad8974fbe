//! `capture` command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use contracts::CaptureBlueprint;
use tracing::{info, warn};

use super::{body_model, build_dispatcher, load_blueprint, revalidate};
use crate::cli::CaptureArgs;
use crate::error::CliError;
use crate::pipeline::CaptureOrchestrator;

/// Execute the `capture` command
pub async fn run_capture(args: &CaptureArgs) -> Result<()> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;
    apply_overrides(&mut blueprint, args);
    revalidate(&blueprint)?;

    info!(
        subject = %blueprint.capture.subject,
        delay_depth = blueprint.processing.delay_depth,
        frequency_hz = blueprint.source.frequency_hz,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!("Metrics endpoint available on port {}", args.metrics_port);
    }

    let model = body_model(blueprint.capture.body_model)?;
    let mut dispatcher = build_dispatcher(&blueprint, &model, args.output.as_deref())?;

    let orchestrator = CaptureOrchestrator::new(
        blueprint,
        model,
        Duration::from_secs(args.source_timeout.max(1)),
    );
    let (stats, _archive) = orchestrator
        .run(&mut dispatcher, shutdown_signal())
        .await
        .context("Capture failed")?;

    stats.print_summary();

    if stats.aborted {
        warn!("Take aborted, nothing was written");
    }
    if !stats.failed_sinks.is_empty() {
        return Err(CliError::SinkFailures {
            names: stats.failed_sinks,
        }
        .into());
    }

    info!("kinetrace capture finished");
    Ok(())
}

fn apply_overrides(blueprint: &mut CaptureBlueprint, args: &CaptureArgs) {
    if let Some(subject) = args.subject {
        blueprint.capture.subject = subject.into();
    }
    if let Some(lead_in) = args.lead_in {
        info!(lead_in, "Overriding lead-in from CLI");
        blueprint.capture.lead_in_s = lead_in;
    }
    if let Some(record) = args.record {
        info!(record, "Overriding recording length from CLI");
        blueprint.capture.record_s = record;
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &CaptureBlueprint) {
    let processing = &blueprint.processing;
    let capture = &blueprint.capture;
    let source = &blueprint.source;

    println!("\n=== Configuration Summary ===\n");
    println!("Processing:");
    println!("  Delay depth: {}", processing.delay_depth);
    println!(
        "  Interpolation step: {:.6}s ({:.2} fps)",
        processing.interpolation_step,
        processing.frame_rate()
    );
    println!("  Min limb length: {}", processing.min_limb_length);
    println!("  Ground feet: {}", processing.ground_feet);
    println!("\nCapture:");
    println!("  Subject: {}", capture.subject);
    println!("  Body model: {:?}", capture.body_model);
    println!("  Lead-in: {}s, record: {}s", capture.lead_in_s, capture.record_s);
    println!("\nSource ({:?}):", source.kind);
    println!(
        "  {} Hz, jitter {}, sway {} m, noise {} m",
        source.frequency_hz, source.timing_jitter, source.sway_amplitude, source.position_noise
    );

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
