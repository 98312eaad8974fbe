//! LogSink - logs a per-stage summary via tracing

use contracts::{ContractError, MotionArchive, MotionSink, MotionStage, Subject};
use tracing::{info, instrument};

/// Sink that logs take summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl MotionSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_sink_write", skip(self, archive), fields(sink = %self.name, subject = %subject))]
    fn write(&mut self, subject: Subject, archive: &MotionArchive) -> Result<(), ContractError> {
        let motions = archive.subject(subject);
        for stage in MotionStage::ALL {
            let sequence = motions.stage(stage);
            info!(
                sink = %self.name,
                %stage,
                frames = sequence.len(),
                duration = sequence.duration(),
                first_serial = sequence.first().map(|f| f.serial),
                "stage summary"
            );
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
