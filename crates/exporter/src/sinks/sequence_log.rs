//! SequenceLogSink - writes the sequence log table for both subjects

use std::collections::HashMap;
use std::fs;

use chrono::Utc;
use contracts::{ContractError, MotionArchive, MotionSink, Subject};
use tracing::{debug, instrument};

use super::{ensure_parent, PathTemplate};
use crate::error;
use crate::report::sequence_log;

pub struct SequenceLogSink {
    name: String,
    path: PathTemplate,
}

impl SequenceLogSink {
    pub fn new(name: impl Into<String>, path: PathTemplate) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }

    /// Create from params map (for factory)
    pub fn from_params(name: impl Into<String>, params: &HashMap<String, String>) -> error::Result<Self> {
        let name = name.into();
        let path = PathTemplate::from_params(&name, params)?;
        Ok(Self::new(name, path))
    }
}

impl MotionSink for SequenceLogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "sequence_log_sink_write", skip(self, archive), fields(sink = %self.name))]
    fn write(&mut self, subject: Subject, archive: &MotionArchive) -> Result<(), ContractError> {
        let path = self.path.resolve(subject);
        ensure_parent(&path)?;
        let text = format!(
            "# generated {} after {} take\n{}",
            Utc::now().to_rfc3339(),
            subject,
            sequence_log(archive)
        );
        fs::write(&path, text)?;
        debug!(path = %path.display(), "sequence log written");
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
