//! Capture orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{CaptureOrchestrator, OfflineCapture, TakeClock};
pub use stats::CaptureStats;
