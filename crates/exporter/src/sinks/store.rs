//! StoreSink - rewrites the binary archive after every take

use std::collections::HashMap;

use contracts::{ContractError, MotionArchive, MotionSink, Subject};
use tracing::{error, instrument};

use super::{ensure_parent, PathTemplate};
use crate::error;
use crate::store::MotionStore;

pub struct StoreSink {
    name: String,
    path: PathTemplate,
    store: MotionStore,
}

impl StoreSink {
    pub fn new(name: impl Into<String>, path: PathTemplate, joint_count: usize) -> Self {
        Self {
            name: name.into(),
            path,
            store: MotionStore::new(joint_count),
        }
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
        joint_count: usize,
    ) -> error::Result<Self> {
        let name = name.into();
        let path = PathTemplate::from_params(&name, params)?;
        Ok(Self::new(name, path, joint_count))
    }
}

impl MotionSink for StoreSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "store_sink_write", skip(self, archive), fields(sink = %self.name, subject = %subject))]
    fn write(&mut self, subject: Subject, archive: &MotionArchive) -> Result<(), ContractError> {
        let path = self.path.resolve(subject);
        ensure_parent(&path)?;
        self.store.save(&path, archive).map_err(|e| {
            error!(sink = %self.name, error = %e, "archive write failed");
            e.into_sink_error(&self.name)
        })
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Frame;
    use tempfile::tempdir;

    #[test]
    fn test_store_sink_writes_loadable_archive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("sequences.bin");
        let mut sink = StoreSink::new(
            "store",
            PathTemplate::new(path.to_string_lossy()),
            0,
        );

        let mut archive = MotionArchive::default();
        archive.athlete.raw = vec![Frame::new(0, 0.0, vec![])].into();
        sink.write(Subject::Athlete, &archive).unwrap();

        assert_eq!(MotionStore::new(0).load(&path).unwrap(), archive);
    }
}
