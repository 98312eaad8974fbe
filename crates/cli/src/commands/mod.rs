//! Command implementations.

mod capture;
mod export;
mod info;
mod process;
mod validate;

pub use capture::run_capture;
pub use export::run_export;
pub use info::run_info;
pub use process::run_process;
pub use validate::run_validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::{BodyModelKind, CaptureBlueprint, MotionSink};
use exporter::{Dispatcher, PathTemplate, StoreSink};
use skeleton::BodyModel;
use tracing::info;

use crate::error::CliError;

/// Load a blueprint, or the built-in defaults when no path is given.
fn load_blueprint(path: Option<&Path>) -> Result<CaptureBlueprint> {
    let Some(path) = path else {
        info!("No configuration given, using defaults");
        return Ok(CaptureBlueprint::default());
    };

    info!(config = %path.display(), "Loading configuration");
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }
    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Re-validate a blueprint after CLI overrides were applied.
fn revalidate(blueprint: &CaptureBlueprint) -> Result<()> {
    config_loader::ConfigLoader::validate(blueprint)
        .map_err(|e| CliError::config_validation(e.to_string()).into())
}

fn body_model(kind: BodyModelKind) -> Result<Arc<BodyModel>> {
    let model = match kind {
        BodyModelKind::KinectV2 => BodyModel::kinect_v2(),
    }
    .context("Failed to build body model")?;
    Ok(Arc::new(model))
}

/// Sinks of the blueprint, plus a store sink for `output` when given.
fn build_dispatcher(
    blueprint: &CaptureBlueprint,
    model: &BodyModel,
    output: Option<&Path>,
) -> Result<Dispatcher> {
    let mut sinks: Vec<Box<dyn MotionSink>> = blueprint
        .sinks
        .iter()
        .map(|config| exporter::create_sink(config, model, &blueprint.processing))
        .collect::<exporter::Result<_>>()
        .context("Failed to create sinks")?;

    if let Some(path) = output {
        sinks.push(Box::new(StoreSink::new(
            "output",
            PathTemplate::new(path.to_string_lossy()),
            model.joint_count(),
        )));
    }

    if sinks.is_empty() {
        tracing::warn!("No sinks configured - processed takes will only be summarized");
    }
    Ok(Dispatcher::new(sinks))
}
