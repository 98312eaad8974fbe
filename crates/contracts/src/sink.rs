//! MotionSink trait - exporter output interface

use crate::{ContractError, MotionArchive, Subject};

/// Motion output trait
///
/// Sinks receive the whole archive after a subject's recording has been
/// processed; each sink decides which subject and stage it persists.
pub trait MotionSink: Send {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Persist the archive after `subject` was (re)processed.
    ///
    /// # Errors
    /// Returns write error (should include context)
    fn write(&mut self, subject: Subject, archive: &MotionArchive) -> Result<(), ContractError>;

    /// Flush buffered output (if any)
    fn flush(&mut self) -> Result<(), ContractError>;
}
