//! Errors crossing crate boundaries.
//!
//! Stage-local failures (recorder, pipeline, store) have their own enums in
//! the owning crates; only configuration and sink failures travel through
//! the contracts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractError {
    /// The blueprint text could not be decoded.
    #[error("{format} config parse error: {message}")]
    ConfigParse {
        format: &'static str,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A decoded blueprint breaks a semantic rule.
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// A motion sink could not persist a take.
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            format: "blueprint",
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a decoder failure, keeping it as the error source.
    pub fn config_decode<E>(format: &'static str, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigParse {
            format,
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// True for errors raised while reading or checking a blueprint.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::ConfigParse { .. } | Self::ConfigValidation { .. })
    }
}
