//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::CaptureBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    subject: String,
    delay_depth: usize,
    frame_rate: f64,
    source_hz: f64,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    subject: blueprint.capture.subject.to_string(),
                    delay_depth: blueprint.processing.delay_depth,
                    frame_rate: blueprint.processing.frame_rate(),
                    source_hz: blueprint.source.frequency_hz,
                    sink_count: blueprint.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &CaptureBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let depth = blueprint.processing.delay_depth as f64;

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - processed takes are not written".to_string());
    }

    // Idle samples the source delivers before recording starts
    let pre_roll = blueprint.capture.lead_in_s * blueprint.source.frequency_hz;
    if pre_roll < depth {
        warnings.push(format!(
            "lead_in_s yields ~{pre_roll:.0} idle samples, fewer than delay_depth {depth}; \
             the lead-in will be padded"
        ));
    }

    // Filtering consumes delay_depth frames at each end of the interpolated take
    let resampled = blueprint.capture.record_s / blueprint.processing.interpolation_step;
    if resampled <= depth * 2.0 {
        warnings.push(format!(
            "record_s covers ~{resampled:.0} resampled frames; the filtered take will be empty"
        ));
    }

    if blueprint.source.frequency_hz < blueprint.processing.frame_rate() {
        warnings.push(format!(
            "source rate {} Hz is below the output rate {:.2} fps",
            blueprint.source.frequency_hz,
            blueprint.processing.frame_rate()
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Subject: {}", summary.subject);
            println!("  Delay depth: {}", summary.delay_depth);
            println!("  Output rate: {:.2} fps", summary.frame_rate);
            println!("  Source rate: {} Hz", summary.source_hz);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
