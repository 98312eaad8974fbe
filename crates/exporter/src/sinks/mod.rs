//! Sink implementations
//!
//! Contains StoreSink, TrcSink, LogSink and SequenceLogSink.

mod log;
mod sequence_log;
mod store;
mod trc;

use std::collections::HashMap;
use std::path::PathBuf;

use contracts::Subject;

use crate::error::{ExportError, Result};

pub use self::log::LogSink;
pub use self::sequence_log::SequenceLogSink;
pub use self::store::StoreSink;
pub use self::trc::TrcSink;

/// `path` parameter; `{subject}` is replaced per write by the subject name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate(String);

impl PathTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn from_params(sink: &str, params: &HashMap<String, String>) -> Result<Self> {
        params
            .get("path")
            .filter(|p| !p.is_empty())
            .map(|p| Self::new(p.as_str()))
            .ok_or_else(|| ExportError::sink_creation(sink, "missing 'path' parameter"))
    }

    pub fn resolve(&self, subject: Subject) -> PathBuf {
        PathBuf::from(self.0.replace("{subject}", subject.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Create the parent directory of `path` if it has one.
fn ensure_parent(path: &std::path::Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}
