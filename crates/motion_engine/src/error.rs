//! Motion engine errors
//!
//! Numeric trouble inside a take is never an error (see `Diagnostics`);
//! these cover inputs that do not fit the body model at all.

use ingestion::IngestionError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MotionError {
    #[error("frame {serial} has {actual} joints, body model has {expected}")]
    JointCount {
        serial: i32,
        expected: usize,
        actual: usize,
    },

    #[error("invalid smoothing kernel: {0}")]
    Kernel(String),

    #[error(transparent)]
    Ingestion(#[from] IngestionError),
}

pub type Result<T> = std::result::Result<T, MotionError>;
