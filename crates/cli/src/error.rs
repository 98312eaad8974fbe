//! Error types for CLI operations.

use contracts::Subject;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Override rejected by validation
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// The pose source stopped delivering samples
    #[error("Pose source '{source_id}' silent for {seconds}s")]
    SourceTimeout { source_id: String, seconds: u64 },

    /// The sample channel closed before the take was finished
    #[error("Pose stream closed before the take finished")]
    StreamClosed,

    /// The requested stage holds no frames
    #[error("{subject} {stage} sequence is empty")]
    EmptySequence { subject: Subject, stage: String },

    /// Some sinks failed to write
    #[error("Sinks failed: {}", names.join(", "))]
    SinkFailures { names: Vec<String> },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    pub fn source_timeout(source_id: impl Into<String>, seconds: u64) -> Self {
        Self::SourceTimeout {
            source_id: source_id.into(),
            seconds,
        }
    }
}
