//! Exporter error types

use contracts::{ContractError, MotionStage, Subject};
use thiserror::Error;

/// Exporter-specific errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary encoding / decoding error
    #[error("store encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// Stored frame does not match the body model
    #[error("{subject} {stage} frame {serial}: expected {expected} joints, got {actual}")]
    JointCount {
        subject: Subject,
        stage: MotionStage,
        serial: i32,
        expected: usize,
        actual: usize,
    },

    /// Malformed input or parameters
    #[error("format error: {0}")]
    Format(String),

    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },
}

impl ExportError {
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Wrap as a sink write failure for the [`contracts::MotionSink`] boundary.
    pub fn into_sink_error(self, sink_name: &str) -> ContractError {
        ContractError::sink_write(sink_name, self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
