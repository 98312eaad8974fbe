//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::CaptureBlueprint;
use serde::Serialize;
use skeleton::{BodyModel, LimbRole};
use tracing::info;

use super::{body_model, load_blueprint};
use crate::cli::InfoArgs;

/// Model and configuration info for JSON output
#[derive(Serialize)]
struct ModelInfo {
    model: String,
    joint_count: usize,
    limb_count: usize,
    processing: ProcessingInfo,
    capture: CaptureInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    joints: Vec<JointInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    limbs: Vec<LimbInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct ProcessingInfo {
    delay_depth: usize,
    interpolation_step: f64,
    frame_rate: f64,
    min_limb_length: f64,
    ground_feet: bool,
    repoint_thumbs: bool,
}

#[derive(Serialize)]
struct CaptureInfo {
    subject: String,
    lead_in_s: f64,
    record_s: f64,
    source_hz: f64,
}

#[derive(Serialize)]
struct JointInfo {
    id: usize,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    helper: Option<String>,
    children: Vec<String>,
}

#[derive(Serialize)]
struct LimbInfo {
    name: String,
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sibling: Option<String>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let blueprint = load_blueprint(args.config.as_deref())?;
    let model = body_model(blueprint.capture.body_model)?;
    info!(model = model.name(), "Loading model info");

    if args.json {
        let info = build_model_info(&blueprint, &model, args);
        let json = serde_json::to_string_pretty(&info).context("Failed to serialize model info")?;
        println!("{}", json);
    } else {
        print_model_info(&blueprint, &model, args);
    }

    Ok(())
}

fn build_model_info(blueprint: &CaptureBlueprint, model: &BodyModel, args: &InfoArgs) -> ModelInfo {
    let hierarchy = model.hierarchy();
    let processing = &blueprint.processing;

    let joints = if args.joints {
        hierarchy
            .ids()
            .map(|id| JointInfo {
                id: id.index(),
                name: hierarchy.name_of(id).to_string(),
                parent: hierarchy.parent_of(id).map(|p| hierarchy.name_of(p).to_string()),
                helper: hierarchy.helper_of(id).map(|h| hierarchy.name_of(h).to_string()),
                children: hierarchy
                    .children_of(id)
                    .iter()
                    .map(|c| hierarchy.name_of(*c).to_string())
                    .collect(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let limbs = if args.limbs {
        model
            .limbs()
            .iter()
            .map(|limb| LimbInfo {
                name: limb.name.clone(),
                role: role_name(limb.role).to_string(),
                sibling: limb
                    .sibling
                    .and_then(|s| model.limbs().get(s))
                    .map(|s| s.name.clone()),
            })
            .collect()
    } else {
        Vec::new()
    };

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
            })
            .collect()
    } else {
        Vec::new()
    };

    ModelInfo {
        model: model.name().to_string(),
        joint_count: model.joint_count(),
        limb_count: model.limbs().len(),
        processing: ProcessingInfo {
            delay_depth: processing.delay_depth,
            interpolation_step: processing.interpolation_step,
            frame_rate: processing.frame_rate(),
            min_limb_length: processing.min_limb_length,
            ground_feet: processing.ground_feet,
            repoint_thumbs: processing.repoint_thumbs,
        },
        capture: CaptureInfo {
            subject: blueprint.capture.subject.to_string(),
            lead_in_s: blueprint.capture.lead_in_s,
            record_s: blueprint.capture.record_s,
            source_hz: blueprint.source.frequency_hz,
        },
        joints,
        limbs,
        sinks,
    }
}

fn role_name(role: LimbRole) -> &'static str {
    match role {
        LimbRole::Segment => "segment",
        LimbRole::Helper => "helper",
    }
}

fn print_model_info(blueprint: &CaptureBlueprint, model: &BodyModel, args: &InfoArgs) {
    let processing = &blueprint.processing;

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 kinetrace Body Model                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🦴 Model");
    println!("   ├─ Name: {}", model.name());
    println!("   ├─ Joints: {}", model.joint_count());
    println!("   └─ Limbs: {}", model.limbs().len());

    println!("\n⚙️  Processing");
    println!("   ├─ Delay depth: {}", processing.delay_depth);
    println!(
        "   ├─ Interpolation step: {:.6}s ({:.2} fps)",
        processing.interpolation_step,
        processing.frame_rate()
    );
    println!("   ├─ Min limb length: {}", processing.min_limb_length);
    println!("   ├─ Ground feet: {}", processing.ground_feet);
    println!("   └─ Repoint thumbs: {}", processing.repoint_thumbs);

    println!("\n🎥 Capture");
    println!("   ├─ Subject: {}", blueprint.capture.subject);
    println!(
        "   ├─ Lead-in / record: {}s / {}s",
        blueprint.capture.lead_in_s, blueprint.capture.record_s
    );
    println!("   └─ Source: {:?} at {} Hz", blueprint.source.kind, blueprint.source.frequency_hz);

    if args.joints {
        println!("\n🧍 Joints");
        print!("{}", exporter::hierarchy_listing(model.hierarchy()));
    }

    if args.limbs {
        println!("\n📏 Limbs ({})", model.limbs().len());
        let count = model.limbs().len();
        for (i, limb) in model.limbs().iter().enumerate() {
            let prefix = if i + 1 == count { "└─" } else { "├─" };
            let sibling = limb
                .sibling
                .and_then(|s| model.limbs().get(s))
                .map(|s| format!(" ~ {}", s.name))
                .unwrap_or_default();
            println!("   {} {} [{}]{}", prefix, limb.name, role_name(limb.role), sibling);
        }
    }

    if args.sinks && !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let is_last = i == blueprint.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);
        }
    }

    println!();
}
