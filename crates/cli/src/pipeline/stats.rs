//! Capture statistics and summary output.

use std::time::Duration;

use exporter::DispatchReport;
use motion_engine::CaptureSession;
use observability::PipelineMetricsAggregator;

/// Statistics from a capture run
#[derive(Debug, Clone, Default)]
pub struct CaptureStats {
    /// Samples produced by the source
    pub samples_received: u64,

    /// Samples dropped on a full channel
    pub samples_dropped: u64,

    /// Samples fed into the capture session
    pub samples_consumed: u64,

    /// Capture rate estimated from accepted timestamps
    pub observed_rate: Option<f64>,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Number of configured sinks
    pub active_sinks: usize,

    /// Successful sink writes over all takes
    pub sinks_written: usize,

    /// Sinks that failed at least once
    pub failed_sinks: Vec<String>,

    /// The take was interrupted before it finished
    pub aborted: bool,

    /// Per-take processing metrics
    pub metrics: PipelineMetricsAggregator,
}

impl CaptureStats {
    /// Account for a take the session just completed and its dispatch.
    pub fn record_take(&mut self, session: &CaptureSession, report: DispatchReport) {
        if let Some(processed) = session.latest() {
            self.metrics.update(&processed.meta);
        }
        self.sinks_written += report.written;
        for name in report.failed {
            if !self.failed_sinks.contains(&name) {
                self.failed_sinks.push(name);
            }
        }
    }

    /// Share of received samples that were dropped, in percent
    pub fn drop_rate(&self) -> f64 {
        if self.samples_received > 0 {
            (self.samples_dropped as f64 / self.samples_received as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Capture Statistics                        ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Samples received: {}", self.samples_received);
        println!(
            "   ├─ Samples dropped: {} ({:.2}%)",
            self.samples_dropped,
            self.drop_rate()
        );
        println!("   ├─ Samples consumed: {}", self.samples_consumed);
        match self.observed_rate {
            Some(rate) => println!("   ├─ Capture rate: {rate:.2} Hz"),
            None => println!("   ├─ Capture rate: N/A"),
        }
        println!("   ├─ Active sinks: {}", self.active_sinks);
        println!("   └─ Aborted: {}", if self.aborted { "yes" } else { "no" });

        if !self.failed_sinks.is_empty() {
            println!("\n⚠️  Failed Sinks");
            for name in &self.failed_sinks {
                println!("   ├─ {name}");
            }
        }

        println!("\n📈 {}", self.metrics.summary());
    }
}
